use std::fmt::{self, Display, Formatter};

use crate::{
    color::Color,
    feedback::SquareFeedback,
    oracle::IndexableBoard,
    piece::ColoredPieceKind,
    square::Square,
};

const LIGHT: &str = "\x1b[30;107m";
const DARK: &str = "\x1b[30;47m";
const LAST_MOVE: &str = "\x1b[30;103m";
const MOVED: &str = "\x1b[30;106m";
const EXHAUSTED: &str = "\x1b[30;101m";
const RESET: &str = "\x1b[0m";

pub struct BoardDisplay<'a, 'b, T> {
    pub board: T,
    pub view: Color,
    pub feedback: &'a [SquareFeedback],
    pub info: &'b str,
}
impl<T> BoardDisplay<'_, '_, T> {
    fn background(&self, square: Square) -> &'static str {
        match self.feedback.iter().find(|hint| hint.square == square) {
            Some(hint) if hint.exhausted => EXHAUSTED,
            Some(hint) if hint.last_move.is_some() => LAST_MOVE,
            Some(hint) if hint.moves_made > 0 => MOVED,
            _ if square.is_light() => LIGHT,
            _ => DARK,
        }
    }
}
impl<T> Display for BoardDisplay<'_, '_, T>
where
    T: IndexableBoard,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut lines = self.info.lines().fuse();
        for row in 0..8 {
            let rank = match self.view {
                Color::White => 7 - row,
                Color::Black => row,
            };
            for column in 0..8 {
                let file = match self.view {
                    Color::White => column,
                    Color::Black => 7 - column,
                };
                let square = Square::new(file, rank);
                let figurine = self
                    .board
                    .piece_on(square)
                    .map_or(' ', ColoredPieceKind::figurine);
                write!(f, "{}{figurine} {RESET}", self.background(square))?;
            }
            write!(f, "{}", rank + 1)?;
            if let Some(line) = lines.next() {
                write!(f, " {line}")?;
            }
            writeln!(f)?;
        }
        match self.view {
            Color::White => write!(f, "a b c d e f g h")?,
            Color::Black => write!(f, "h g f e d c b a")?,
        }
        if let Some(line) = lines.next() {
            write!(f, "   {line}")?;
        }
        writeln!(f)?;
        for line in lines {
            writeln!(f, "                  {line}")?;
        }
        Ok(())
    }
}
#[cfg(test)]
mod test {
    use crate::{
        board_display::BoardDisplay,
        color::Color,
        oracle::{ChessOracle, Oracle},
    };

    #[test]
    fn black_sees_the_board_flipped() {
        let board = ChessOracle.starting_position();
        let text = BoardDisplay {
            board: &board,
            view: Color::Black,
            feedback: &[],
            info: "black plays",
        }
        .to_string();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("\x1b[30;107m♖"));
        assert!(first.ends_with("1 black plays"));
        assert!(text.contains("h g f e d c b a"));
    }
}
