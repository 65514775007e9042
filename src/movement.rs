use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    piece::{InvalidFenPiece, PieceKind},
    square::{ParseSquareError, Square},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ParseMoveError {
    #[error("provided string contains invalid character")]
    InvalidChar,
    #[error(transparent)]
    Square(#[from] ParseSquareError),
    #[error(transparent)]
    Piece(#[from] InvalidFenPiece),
    #[error("`{0}` is not a promotion choice")]
    NotPromotion(PieceKind),
    #[error("unexpected `{0}`")]
    Unexpected(char),
}

/// A candidate move, written in long algebraic notation (`e2e4`, `e7e8q`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}
impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }
    pub fn promoting(self, piece: PieceKind) -> Self {
        Move {
            promotion: Some(piece),
            ..self
        }
    }
}
impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.lowercase())?;
        }
        Ok(())
    }
}
impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let from = s.get(0..2).ok_or(ParseMoveError::InvalidChar)?.parse()?;
        let to = s.get(2..4).ok_or(ParseMoveError::InvalidChar)?.parse()?;
        let mut rest = s
            .get(4..)
            .ok_or(ParseMoveError::InvalidChar)?
            .chars()
            .fuse();
        let promotion = rest.next().map(PieceKind::from_fen).transpose()?;
        if let Some(piece) =
            promotion.filter(|piece| !PieceKind::PROMOTION_CHOICES.contains(piece))
        {
            return Err(ParseMoveError::NotPromotion(piece));
        }
        if let Some(c) = rest.next() {
            return Err(ParseMoveError::Unexpected(c));
        }
        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}
impl From<Move> for chess::ChessMove {
    fn from(value: Move) -> Self {
        chess::ChessMove::new(
            value.from.into(),
            value.to.into(),
            value.promotion.map(Into::into),
        )
    }
}
impl From<chess::ChessMove> for Move {
    fn from(value: chess::ChessMove) -> Self {
        Move {
            from: value.get_source().into(),
            to: value.get_dest().into(),
            promotion: value.get_promotion().map(Into::into),
        }
    }
}

/// An accepted move as kept in the persisted blind sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedMove {
    pub from: Square,
    pub to: Square,
    pub san_notation: String,
    /// 1 based position in the blind sequence.
    pub sequence_index: u32,
}
