use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::{
    config::BlindConfig,
    error::TrackerError,
    movement::Move,
    oracle::{IndexableBoard, Oracle},
    square::Square,
    tracker::{MovementSummary, PieceTracker},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IllegalReason {
    /// Nothing stands on the origin square.
    NoPiece,
    /// The chess rules reject the move.
    NotLegal,
    /// The move checks the opponent's king, so the position cannot be handed
    /// back to the mover.
    ChecksOpponent,
}
impl Display for IllegalReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            IllegalReason::NoPiece => write!(f, "there is no piece to move")?,
            IllegalReason::NotLegal => write!(f, "the move breaks the rules of chess")?,
            IllegalReason::ChecksOpponent => {
                write!(f, "blind moves may not check the opponent's king")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Violation {
    MoveLimitReached { current: u8, max: u8 },
    PieceExhausted { square: Square },
    IllegalMove { reason: IllegalReason },
}
impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MoveLimitReached { current, max } => {
                write!(f, "move limit reached ({current}/{max})")?;
            }
            Violation::PieceExhausted { square } => {
                write!(f, "the piece on {square} has no moves left")?;
            }
            Violation::IllegalMove { reason } => write!(f, "illegal move: {reason}")?,
        }
        Ok(())
    }
}

/// Outcome of [`BlindEngine::validate_move`]. Violations are kept in the order
/// the checks run, so the first one is what the player should read first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationVerdict {
    pub violations: Vec<Violation>,
}
impl ValidationVerdict {
    pub fn rejected(violation: Violation) -> Self {
        ValidationVerdict {
            violations: vec![violation],
        }
    }
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }
}
impl Display for ValidationVerdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            write!(f, "valid")?;
        }
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Decides which moves a player may make during the blind phase.
#[derive(Debug, Clone)]
pub struct BlindEngine<O> {
    oracle: O,
    config: BlindConfig,
    tracker: PieceTracker,
}
impl<O> BlindEngine<O>
where
    O: Oracle,
{
    pub fn new(oracle: O, config: BlindConfig) -> Self {
        BlindEngine {
            oracle,
            config,
            tracker: PieceTracker::new(),
        }
    }
    /// Runs every check and collects each violation. Nothing is mutated.
    ///
    /// A legal move is also rejected when the position after it cannot be
    /// handed back to the mover, i.e. when it checks the opponent's king.
    pub fn validate_move(&self, position: &O::Position, movement: Move) -> ValidationVerdict {
        let mut violations = Vec::new();

        let current = self.tracker.total_moves();
        if current >= self.config.max_moves {
            violations.push(Violation::MoveLimitReached {
                current,
                max: self.config.max_moves,
            });
        }
        let piece = position.piece_on(movement.from);
        if self.tracker.piece_move_count(movement.from) >= self.config.max_per_piece {
            violations.push(Violation::PieceExhausted {
                square: movement.from,
            });
        }
        if let Some(reason) = self.illegality(position, movement, piece.is_some()) {
            violations.push(Violation::IllegalMove { reason });
        }
        ValidationVerdict { violations }
    }
    fn illegality(
        &self,
        position: &O::Position,
        movement: Move,
        has_piece: bool,
    ) -> Option<IllegalReason> {
        let Ok(applied) = self.oracle.apply_move(position, movement) else {
            return Some(if has_piece {
                IllegalReason::NotLegal
            } else {
                IllegalReason::NoPiece
            });
        };
        let mover = self.oracle.side_to_move(position);
        if self
            .oracle
            .with_side_to_move(&applied.position, mover)
            .is_none()
        {
            return Some(IllegalReason::ChecksOpponent);
        }
        None
    }
    /// Bookkeeping for a move already validated and applied through the
    /// oracle.
    pub fn process_move(
        &mut self,
        position_after_move: &O::Position,
        movement: Move,
        san_notation: String,
        sequence_index: u32,
    ) -> Result<(), TrackerError> {
        self.tracker.record_move(
            position_after_move,
            movement.from,
            movement.to,
            san_notation,
            sequence_index,
        )
    }
    pub fn reset(&mut self) {
        self.tracker.reset();
    }
    pub fn summary(&self) -> MovementSummary {
        self.tracker.movement_summary()
    }
    pub fn remaining_moves(&self) -> u8 {
        self.config.max_moves.saturating_sub(self.tracker.total_moves())
    }
    pub fn is_complete(&self) -> bool {
        self.tracker.total_moves() == self.config.max_moves
    }
    pub fn config(&self) -> BlindConfig {
        self.config
    }
    pub fn tracker(&self) -> &PieceTracker {
        &self.tracker
    }
    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}
#[cfg(test)]
mod test {
    use chess::Board;

    use crate::{
        color::Color,
        config::BlindConfig,
        engine::{BlindEngine, IllegalReason, Violation},
        movement::Move,
        oracle::{ChessOracle, Oracle},
    };

    /// Applies a move the way a session does: through the oracle, handing the
    /// turn straight back to the mover.
    fn play(engine: &mut BlindEngine<ChessOracle>, board: &mut Board, movement: &str) {
        let movement: Move = movement.parse().unwrap();
        let verdict = engine.validate_move(board, movement);
        assert!(verdict.is_valid(), "{movement}: {verdict}");
        let oracle = engine.oracle();
        let color = oracle.side_to_move(board);
        let applied = oracle.apply_move(board, movement).unwrap();
        let position = oracle.with_side_to_move(&applied.position, color).unwrap();
        let sequence_index = engine.tracker().next_sequence_index();
        engine
            .process_move(&position, movement, applied.san, sequence_index)
            .unwrap();
        *board = position;
    }

    #[test]
    fn a_piece_moves_at_most_twice() {
        let mut engine = BlindEngine::new(ChessOracle, BlindConfig::default());
        let mut board = Board::default();
        play(&mut engine, &mut board, "e2e4");
        play(&mut engine, &mut board, "e4e5");
        assert_eq!(engine.summary().per_piece_move_counts[&square!("e5")], 2);

        let verdict = engine.validate_move(&board, "e5e6".parse().unwrap());
        assert_eq!(
            verdict.violations,
            [Violation::PieceExhausted {
                square: square!("e5")
            }]
        );
    }
    #[test]
    fn the_sixth_move_is_always_rejected() {
        let mut engine = BlindEngine::new(ChessOracle, BlindConfig::default());
        let mut board = Board::default();
        for movement in ["e2e4", "d2d4", "g1f3", "b1c3", "c1f4"] {
            play(&mut engine, &mut board, movement);
        }
        assert!(engine.is_complete());
        assert_eq!(engine.remaining_moves(), 0);
        let verdict = engine.validate_move(&board, "a2a3".parse().unwrap());
        assert_eq!(
            verdict.violations,
            [Violation::MoveLimitReached { current: 5, max: 5 }]
        );
        let verdict = engine.validate_move(&board, "a2a5".parse().unwrap());
        assert_eq!(
            verdict.violations,
            [
                Violation::MoveLimitReached { current: 5, max: 5 },
                Violation::IllegalMove {
                    reason: IllegalReason::NotLegal
                }
            ]
        );
    }
    #[test]
    fn illegal_moves_only_report_illegality() {
        let engine = BlindEngine::new(ChessOracle, BlindConfig::default());
        let verdict = engine.validate_move(&Board::default(), "e2e5".parse().unwrap());
        assert_eq!(
            verdict.violations,
            [Violation::IllegalMove {
                reason: IllegalReason::NotLegal
            }]
        );
        let verdict = engine.validate_move(&Board::default(), "e4e5".parse().unwrap());
        assert_eq!(
            verdict.violations,
            [Violation::IllegalMove {
                reason: IllegalReason::NoPiece
            }]
        );
    }
    #[test]
    fn checking_moves_are_rejected_up_front() {
        let mut engine = BlindEngine::new(ChessOracle, BlindConfig::default());
        let mut board = Board::default();
        play(&mut engine, &mut board, "e2e4");
        play(&mut engine, &mut board, "f1c4");
        let verdict = engine.validate_move(&board, "c4f7".parse().unwrap());
        assert_eq!(
            verdict.violations,
            [Violation::IllegalMove {
                reason: IllegalReason::ChecksOpponent
            }]
        );
        assert!(engine.validate_move(&board, "c4b5".parse().unwrap()).is_valid());
    }
    #[test]
    fn violations_keep_check_order() {
        let config = BlindConfig {
            max_moves: 2,
            max_per_piece: 2,
        };
        let mut engine = BlindEngine::new(ChessOracle, config);
        let mut board = Board::default();
        play(&mut engine, &mut board, "g1f3");
        play(&mut engine, &mut board, "f3g5");
        let verdict = engine.validate_move(&board, "g5g4".parse().unwrap());
        assert_eq!(
            verdict.violations,
            [
                Violation::MoveLimitReached { current: 2, max: 2 },
                Violation::PieceExhausted {
                    square: square!("g5")
                },
                Violation::IllegalMove {
                    reason: IllegalReason::NotLegal
                },
            ]
        );
        assert_eq!(
            verdict.to_string(),
            "move limit reached (2/2); the piece on g5 has no moves left; \
             illegal move: the move breaks the rules of chess"
        );
    }
    #[test]
    fn promoted_pieces_continue_the_pawn_count() {
        let oracle = ChessOracle;
        let mut board = oracle
            .position_from_fen("8/4P3/8/8/8/8/7k/K7 w - - 0 1")
            .unwrap();
        let mut engine = BlindEngine::new(oracle, BlindConfig::default());
        play(&mut engine, &mut board, "e7e8q");
        play(&mut engine, &mut board, "e8e6");
        assert_eq!(engine.tracker().piece_move_count(square!("e6")), 2);
        let verdict = engine.validate_move(&board, "e6e7".parse().unwrap());
        assert_eq!(
            verdict.violations,
            [Violation::PieceExhausted {
                square: square!("e6")
            }]
        );
    }
    #[test]
    fn limits_are_configurable() {
        let config = BlindConfig {
            max_moves: 1,
            max_per_piece: 1,
        };
        let mut engine = BlindEngine::new(ChessOracle, config);
        let mut board = Board::default();
        play(&mut engine, &mut board, "d2d4");
        assert!(engine.is_complete());
        assert_eq!(engine.oracle().side_to_move(&board), Color::White);
        engine.reset();
        assert_eq!(engine.summary().total_moves, 0);
        assert!(engine.validate_move(&board, "d4d5".parse().unwrap()).is_valid());
    }
}
