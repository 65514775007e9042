use std::{
    fmt::{self, Display, Formatter},
    num::NonZero,
    str::FromStr,
};

use thiserror::Error;

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceKind {
    // `ColoredPieceKind` relies on `PieceKind` being non-zero
    Pawn = 1,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceKind {
    pub const PROMOTION_CHOICES: [Self; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];
    pub fn uppercase(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }
    pub fn lowercase(self) -> char {
        self.uppercase().to_ascii_lowercase()
    }
    pub fn from_fen(c: char) -> Result<Self, InvalidFenPiece> {
        let piece = match c {
            'p' | 'P' => PieceKind::Pawn,
            'n' | 'N' => PieceKind::Knight,
            'b' | 'B' => PieceKind::Bishop,
            'r' | 'R' => PieceKind::Rook,
            'q' | 'Q' => PieceKind::Queen,
            'k' | 'K' => PieceKind::King,
            c => return Err(InvalidFenPiece(c)),
        };
        Ok(piece)
    }
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => PieceKind::Pawn,
            2 => PieceKind::Knight,
            3 => PieceKind::Bishop,
            4 => PieceKind::Rook,
            5 => PieceKind::Queen,
            _ => PieceKind::King,
        }
    }
}
impl Display for PieceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Pawn => write!(f, "pawn")?,
            PieceKind::Knight => write!(f, "knight")?,
            PieceKind::Bishop => write!(f, "bishop")?,
            PieceKind::Rook => write!(f, "rook")?,
            PieceKind::Queen => write!(f, "queen")?,
            PieceKind::King => write!(f, "king")?,
        }
        Ok(())
    }
}
impl From<chess::Piece> for PieceKind {
    fn from(value: chess::Piece) -> Self {
        match value {
            chess::Piece::Pawn => PieceKind::Pawn,
            chess::Piece::Knight => PieceKind::Knight,
            chess::Piece::Bishop => PieceKind::Bishop,
            chess::Piece::Rook => PieceKind::Rook,
            chess::Piece::Queen => PieceKind::Queen,
            chess::Piece::King => PieceKind::King,
        }
    }
}
impl From<PieceKind> for chess::Piece {
    fn from(value: PieceKind) -> Self {
        match value {
            PieceKind::Pawn => chess::Piece::Pawn,
            PieceKind::Knight => chess::Piece::Knight,
            PieceKind::Bishop => chess::Piece::Bishop,
            PieceKind::Rook => chess::Piece::Rook,
            PieceKind::Queen => chess::Piece::Queen,
            PieceKind::King => chess::Piece::King,
        }
    }
}

// Bit structure: 0000CPPP
// C - Color, 1 for white
// P - Piece kind
/// A piece as reported by a drag and drop, written as a piece code such as
/// `wP` or `bN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColoredPieceKind(NonZero<u8>);
impl ColoredPieceKind {
    pub fn new(color: Color, piece: PieceKind) -> Self {
        let color = match color {
            Color::White => 1,
            Color::Black => 0,
        };
        let data = (color << 3) | piece as u8;
        ColoredPieceKind(NonZero::new(data).unwrap())
    }
    pub fn color(self) -> Color {
        if (self.0.get() >> 3) & 0b_1 == 1 {
            Color::White
        } else {
            Color::Black
        }
    }
    pub fn piece(self) -> PieceKind {
        PieceKind::from_bits(self.0.get() & 0b_111)
    }
    pub fn fen(self) -> char {
        match self.color() {
            Color::White => self.piece().uppercase(),
            Color::Black => self.piece().lowercase(),
        }
    }
    pub fn figurine(self) -> char {
        match (self.color(), self.piece()) {
            (Color::White, PieceKind::Pawn) => '♙',
            (Color::White, PieceKind::Knight) => '♘',
            (Color::White, PieceKind::Bishop) => '♗',
            (Color::White, PieceKind::Rook) => '♖',
            (Color::White, PieceKind::Queen) => '♕',
            (Color::White, PieceKind::King) => '♔',
            (Color::Black, PieceKind::Pawn) => '♟',
            (Color::Black, PieceKind::Knight) => '♞',
            (Color::Black, PieceKind::Bishop) => '♝',
            (Color::Black, PieceKind::Rook) => '♜',
            (Color::Black, PieceKind::Queen) => '♛',
            (Color::Black, PieceKind::King) => '♚',
        }
    }
}
/// Writes the piece code, e.g. `wP`.
impl Display for ColoredPieceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color().lowercase(), self.piece().uppercase())?;
        Ok(())
    }
}
impl FromStr for ColoredPieceKind {
    type Err = ParsePieceCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let color = match chars.next() {
            Some('w') => Color::White,
            Some('b') => Color::Black,
            Some(c) => return Err(ParsePieceCodeError::InvalidColor(c)),
            None => return Err(ParsePieceCodeError::Empty),
        };
        let piece = match chars.next() {
            Some(c) if c.is_ascii_uppercase() => PieceKind::from_fen(c)?,
            Some(c) => return Err(InvalidFenPiece(c).into()),
            None => return Err(ParsePieceCodeError::MissingPiece),
        };
        if let Some(c) = chars.next() {
            return Err(ParsePieceCodeError::Unexpected(c));
        }
        Ok(ColoredPieceKind::new(color, piece))
    }
}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error(
    "found `{0}`, expected one of `p`, `n`, `b`, `r`, `k`, `q`, or uppercase forms of these letters"
)]
pub struct InvalidFenPiece(pub char);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ParsePieceCodeError {
    #[error("piece code is empty")]
    Empty,
    #[error("found `{0}`, expected `w` or `b`")]
    InvalidColor(char),
    #[error("piece code is missing its piece letter")]
    MissingPiece,
    #[error(transparent)]
    InvalidPiece(#[from] InvalidFenPiece),
    #[error("unexpected `{0}`")]
    Unexpected(char),
}
