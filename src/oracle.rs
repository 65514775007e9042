//! The chess rules oracle: standard legality and position updates.
//!
//! Nothing here knows about the blind phase. The blind-phase policies (move
//! caps, turn spoofing) live in the engine and the session.

use chess::{Board, BoardBuilder, BoardStatus, ChessMove, MoveGen};
use thiserror::Error;

use crate::{
    color::Color,
    movement::Move,
    piece::{ColoredPieceKind, PieceKind},
    square::Square,
};

pub trait IndexableBoard {
    fn piece_on(&self, square: Square) -> Option<ColoredPieceKind>;
}
impl<T> IndexableBoard for &T
where
    T: IndexableBoard + ?Sized,
{
    fn piece_on(&self, square: Square) -> Option<ColoredPieceKind> {
        T::piece_on(self, square)
    }
}
impl IndexableBoard for Board {
    fn piece_on(&self, square: Square) -> Option<ColoredPieceKind> {
        let square = square.into();
        let piece = Board::piece_on(self, square)?;
        let color = self.color_on(square)?;
        Some(ColoredPieceKind::new(color.into(), piece.into()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{0} is not a legal move")]
pub struct IllegalMoveError(pub Move);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("invalid fen: {0}")]
pub struct InvalidFen(pub String);

/// A position produced by [`Oracle::apply_move`] together with the SAN of the
/// move that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<P> {
    pub position: P,
    pub san: String,
}

pub trait Oracle {
    type Position: Clone + IndexableBoard;

    fn starting_position(&self) -> Self::Position;
    fn side_to_move(&self, position: &Self::Position) -> Color;
    fn is_legal(&self, position: &Self::Position, movement: Move) -> bool;
    fn apply_move(
        &self,
        position: &Self::Position,
        movement: Move,
    ) -> Result<Applied<Self::Position>, IllegalMoveError>;
    /// Edits the side to move, clearing any en passant target. `None` when the
    /// edited position is not a valid chess position.
    fn with_side_to_move(&self, position: &Self::Position, color: Color)
    -> Option<Self::Position>;
}

/// [`Oracle`] backed by the `chess` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChessOracle;

impl ChessOracle {
    pub fn position_from_fen(&self, fen: &str) -> Result<Board, InvalidFen> {
        fen.parse().map_err(|err: chess::Error| InvalidFen(err.to_string()))
    }
}
impl Oracle for ChessOracle {
    type Position = Board;

    fn starting_position(&self) -> Board {
        Board::default()
    }
    fn side_to_move(&self, position: &Board) -> Color {
        position.side_to_move().into()
    }
    fn is_legal(&self, position: &Board, movement: Move) -> bool {
        position.legal(movement.into())
    }
    fn apply_move(
        &self,
        position: &Board,
        movement: Move,
    ) -> Result<Applied<Board>, IllegalMoveError> {
        let chess_move = ChessMove::from(movement);
        if !position.legal(chess_move) {
            return Err(IllegalMoveError(movement));
        }
        let san = san(position, chess_move);
        Ok(Applied {
            position: position.make_move_new(chess_move),
            san,
        })
    }
    fn with_side_to_move(&self, position: &Board, color: Color) -> Option<Board> {
        let mut builder = BoardBuilder::from(*position);
        builder.side_to_move(color.into()).en_passant(None);
        Board::try_from(&builder).ok()
    }
}

/// Standard algebraic notation of a legal move.
fn san(board: &Board, movement: ChessMove) -> String {
    let source = movement.get_source();
    let dest = movement.get_dest();
    let piece = board.piece_on(source).map_or(PieceKind::Pawn, PieceKind::from);
    let from = Square::from(source);
    let to = Square::from(dest);
    let mut san = String::new();

    if piece == PieceKind::King && from.file().abs_diff(to.file()) == 2 {
        san.push_str(if to.file() > from.file() { "O-O" } else { "O-O-O" });
    } else {
        let is_capture = board.piece_on(dest).is_some()
            || (piece == PieceKind::Pawn && from.file() != to.file());
        if piece == PieceKind::Pawn {
            if is_capture {
                san.push(from.file_char());
            }
        } else {
            san.push(piece.uppercase());
            let rivals: Vec<Square> = MoveGen::new_legal(board)
                .filter(|other| {
                    other.get_dest() == dest
                        && other.get_source() != source
                        && board.piece_on(other.get_source()) == Some(piece.into())
                })
                .map(|other| other.get_source().into())
                .collect();
            if !rivals.is_empty() {
                let shares_file = rivals.iter().any(|rival| rival.file() == from.file());
                let shares_rank = rivals.iter().any(|rival| rival.rank() == from.rank());
                if !shares_file {
                    san.push(from.file_char());
                } else if !shares_rank {
                    san.push(from.rank_char());
                } else {
                    san.push(from.file_char());
                    san.push(from.rank_char());
                }
            }
        }
        if is_capture {
            san.push('x');
        }
        san.push(to.file_char());
        san.push(to.rank_char());
        if let Some(promotion) = movement.get_promotion() {
            san.push('=');
            san.push(PieceKind::from(promotion).uppercase());
        }
    }
    let after = board.make_move_new(movement);
    if after.status() == BoardStatus::Checkmate {
        san.push('#');
    } else if after.checkers().popcnt() > 0 {
        san.push('+');
    }
    san
}
#[cfg(test)]
mod test {
    use crate::{
        color::Color,
        movement::Move,
        oracle::{ChessOracle, IndexableBoard, Oracle},
        piece::ColoredPieceKind,
    };

    fn san_of(fen: &str, movement: &str) -> String {
        let oracle = ChessOracle;
        let board = oracle.position_from_fen(fen).unwrap();
        oracle
            .apply_move(&board, movement.parse().unwrap())
            .unwrap()
            .san
    }
    #[test]
    fn standard_algebraic_notation() {
        let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        assert_eq!(san_of(start, "e2e4"), "e4");
        assert_eq!(san_of(start, "g1f3"), "Nf3");
        assert_eq!(
            san_of("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", "e4d5"),
            "exd5"
        );
        assert_eq!(
            san_of("4k3/8/8/8/8/8/8/4K2R w K - 0 1", "e1g1"),
            "O-O"
        );
        assert_eq!(
            san_of("8/4P3/8/8/8/8/7k/K7 w - - 0 1", "e7e8q"),
            "e8=Q"
        );
        assert_eq!(
            san_of("4k3/8/8/8/8/8/8/R4RK1 w - - 0 1", "a1d1"),
            "Rad1"
        );
        assert_eq!(
            san_of("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1", "a1a8"),
            "Ra8#"
        );
        assert_eq!(
            san_of("4k3/8/8/8/8/8/8/4K2R w - - 0 1", "h1h8"),
            "Rh8+"
        );
    }
    #[test]
    fn rejects_illegal_moves() {
        let oracle = ChessOracle;
        let board = oracle.starting_position();
        let movement: Move = "e2e5".parse().unwrap();
        assert!(!oracle.is_legal(&board, movement));
        assert!(oracle.apply_move(&board, movement).is_err());
    }
    #[test]
    fn side_to_move_can_be_edited() {
        let oracle = ChessOracle;
        let start = oracle.starting_position();
        let after = oracle
            .apply_move(&start, "e2e4".parse().unwrap())
            .unwrap()
            .position;
        assert_eq!(oracle.side_to_move(&after), Color::Black);
        let spoofed = oracle.with_side_to_move(&after, Color::White).unwrap();
        assert_eq!(oracle.side_to_move(&spoofed), Color::White);
        assert!(oracle.is_legal(&spoofed, "e4e5".parse().unwrap()));
        assert_eq!(
            IndexableBoard::piece_on(&spoofed, square!("e4")),
            Some("wP".parse::<ColoredPieceKind>().unwrap())
        );
    }
    #[test]
    fn opponent_in_check_cannot_be_handed_back() {
        let oracle = ChessOracle;
        let board = oracle
            .position_from_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 1")
            .unwrap();
        let after = oracle
            .apply_move(&board, "h1h8".parse().unwrap())
            .unwrap()
            .position;
        assert_eq!(oracle.with_side_to_move(&after, Color::White), None);
    }
}
