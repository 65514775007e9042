use std::{
    fmt::{self, Display, Formatter},
    num::NonZero,
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ParseSquareError {
    #[error("found `{0}`, characters from `a` to `h` were expected instead")]
    InvalidFile(char),
    #[error("found `{0}`, characters from `1` to `8` were expected instead")]
    InvalidRank(char),
    #[error("provided string have length of {0} characters, 2 were expected")]
    NotEnoughCharacter(u8),
    #[error("unexpected `{0}`")]
    Unexpected(char),
}

/// Shorthand for a square known at compile time, e.g. `square!("e2")`.
#[macro_export]
macro_rules! square {
    ($name:literal) => {
        const { $crate::square::Square::from_name($name) }
    };
}

// Bit structure: 10FFFRRR
// first two bits is always `10` for `NonZero` size optimizations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(NonZero<u8>);

impl Square {
    pub const fn new(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8);
        debug_assert!(rank < 8);
        let byte = 0b1000_0000 | (file << 3) | rank;
        match NonZero::new(byte) {
            Some(byte) => Square(byte),
            None => unreachable!(),
        }
    }
    pub fn new_checked(file: u8, rank: u8) -> Option<Self> {
        if file >= 8 || rank >= 8 {
            None
        } else {
            Some(Self::new(file, rank))
        }
    }
    /// Panics on anything other than `a1`..`h8`; meant for the `square!` macro.
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        assert!(bytes.len() == 2, "square names have two characters");
        assert!(bytes[0] >= b'a' && bytes[0] <= b'h', "invalid file");
        assert!(bytes[1] >= b'1' && bytes[1] <= b'8', "invalid rank");
        Square::new(bytes[0] - b'a', bytes[1] - b'1')
    }
    pub fn from_chars(file: char, rank: char) -> Result<Self, ParseSquareError> {
        let file = match file {
            'a'..='h' => file as u8 - b'a',
            _ => return Err(ParseSquareError::InvalidFile(file)),
        };
        let rank = match rank {
            '1'..='8' => rank as u8 - b'1',
            _ => return Err(ParseSquareError::InvalidRank(rank)),
        };
        Ok(Square::new(file, rank))
    }
    /// 0 for the a-file.
    pub fn file(self) -> u8 {
        (self.0.get() >> 3) & 0b_111
    }
    /// 0 for the first rank.
    pub fn rank(self) -> u8 {
        self.0.get() & 0b_111
    }
    pub fn file_char(self) -> char {
        (self.file() + b'a') as char
    }
    pub fn rank_char(self) -> char {
        (self.rank() + b'1') as char
    }
    pub fn is_light(self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }
    pub fn all() -> impl Iterator<Item = Self> {
        (0..8).flat_map(|rank| (0..8).map(move |file| Square::new(file, rank)))
    }
}
impl Display for Square {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())?;
        Ok(())
    }
}
impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let Some(file) = chars.next() else {
            return Err(ParseSquareError::NotEnoughCharacter(0));
        };
        let Some(rank) = chars.next() else {
            return Err(ParseSquareError::NotEnoughCharacter(1));
        };
        if let Some(c) = chars.next() {
            return Err(ParseSquareError::Unexpected(c));
        }
        Square::from_chars(file, rank)
    }
}
impl From<chess::Square> for Square {
    // both indices are below 8 by construction
    #[allow(clippy::cast_possible_truncation)]
    fn from(value: chess::Square) -> Self {
        Square::new(
            value.get_file().to_index() as u8,
            value.get_rank().to_index() as u8,
        )
    }
}
impl From<Square> for chess::Square {
    fn from(value: Square) -> Self {
        chess::Square::make_square(
            chess::Rank::from_index(value.rank().into()),
            chess::File::from_index(value.file().into()),
        )
    }
}
impl Serialize for Square {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
impl<'de> Deserialize<'de> for Square {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}
#[cfg(test)]
mod test {
    use crate::square::{ParseSquareError, Square};

    #[test]
    fn parse_and_display() {
        let square: Square = "e4".parse().unwrap();
        assert_eq!(square.file(), 4);
        assert_eq!(square.rank(), 3);
        assert_eq!(square.to_string(), "e4");
        assert_eq!(square, square!("e4"));
    }
    #[test]
    fn rejects_bad_names() {
        assert_eq!("i1".parse::<Square>(), Err(ParseSquareError::InvalidFile('i')));
        assert_eq!("a9".parse::<Square>(), Err(ParseSquareError::InvalidRank('9')));
        assert_eq!("a".parse::<Square>(), Err(ParseSquareError::NotEnoughCharacter(1)));
        assert_eq!("a1x".parse::<Square>(), Err(ParseSquareError::Unexpected('x')));
    }
    #[test]
    fn converts_to_and_from_chess_squares() {
        for square in Square::all() {
            let other: chess::Square = square.into();
            assert_eq!(other.to_string(), square.to_string());
            assert_eq!(Square::from(other), square);
        }
    }
    #[test]
    fn square_colors() {
        assert!(!square!("a1").is_light());
        assert!(square!("h1").is_light());
    }
}
