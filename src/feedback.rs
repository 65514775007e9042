//! Per-square hints for whoever draws the board.

use serde::Serialize;

use crate::{
    color::Color, config::BlindConfig, oracle::IndexableBoard, square::Square,
    tracker::PieceTracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LastMoveEnd {
    Origin,
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquareFeedback {
    pub square: Square,
    pub moves_made: u8,
    pub moves_left: u8,
    /// The piece has used up its moves, or the whole sequence is complete.
    pub exhausted: bool,
    pub last_move: Option<LastMoveEnd>,
}

/// Feedback for every square holding one of `color`'s pieces plus the origin
/// of the last move, ordered from a1 to h8.
pub fn annotate(
    position: &impl IndexableBoard,
    color: Color,
    tracker: &PieceTracker,
    config: BlindConfig,
) -> Vec<SquareFeedback> {
    let complete = tracker.total_moves() >= config.max_moves;
    let last = tracker.last_move();
    Square::all()
        .filter_map(|square| {
            let last_move = match last {
                Some(last) if last.to == square => Some(LastMoveEnd::Destination),
                Some(last) if last.from == square => Some(LastMoveEnd::Origin),
                _ => None,
            };
            let own = position
                .piece_on(square)
                .is_some_and(|piece| piece.color() == color);
            if !own && last_move.is_none() {
                return None;
            }
            let moves_made = if own {
                tracker.piece_move_count(square)
            } else {
                0
            };
            let moves_left = config.max_per_piece.saturating_sub(moves_made);
            Some(SquareFeedback {
                square,
                moves_made,
                moves_left,
                exhausted: own && (moves_left == 0 || complete),
                last_move,
            })
        })
        .collect()
}
#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        config::BlindConfig,
        feedback::{LastMoveEnd, annotate},
        oracle::{ChessOracle, Oracle},
        tracker::PieceTracker,
    };

    #[test]
    fn marks_moved_and_exhausted_pieces() {
        let oracle = ChessOracle;
        let mut tracker = PieceTracker::new();
        let mut board = oracle.starting_position();
        for (i, movement) in ["e2e4", "e4e5"].into_iter().enumerate() {
            let movement = movement.parse().unwrap();
            let applied = oracle.apply_move(&board, movement).unwrap();
            board = oracle
                .with_side_to_move(&applied.position, Color::White)
                .unwrap();
            tracker
                .record_move(
                    &board,
                    movement.from,
                    movement.to,
                    applied.san,
                    u32::try_from(i).unwrap() + 1,
                )
                .unwrap();
        }
        let feedback = annotate(&board, Color::White, &tracker, BlindConfig::default());
        assert_eq!(feedback.len(), 17);

        let pawn = feedback
            .iter()
            .find(|hint| hint.square == square!("e5"))
            .unwrap();
        assert_eq!(pawn.moves_made, 2);
        assert!(pawn.exhausted);
        assert_eq!(pawn.last_move, Some(LastMoveEnd::Destination));

        let origin = feedback
            .iter()
            .find(|hint| hint.square == square!("e4"))
            .unwrap();
        assert_eq!(origin.last_move, Some(LastMoveEnd::Origin));
        assert!(!origin.exhausted);

        let knight = feedback
            .iter()
            .find(|hint| hint.square == square!("g1"))
            .unwrap();
        assert_eq!((knight.moves_made, knight.moves_left), (0, 2));
        assert!(!feedback.iter().any(|hint| hint.square == square!("e7")));
    }
}
