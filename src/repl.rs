use std::{
    fmt::{self, Display, Formatter, Write as _},
    fs,
    io::{self, BufRead, Write, stderr, stdin, stdout},
    str::FromStr,
    time::Instant,
};

use thiserror::Error;

use crate::{
    board_display::BoardDisplay,
    color::{Color, ParseColorError},
    movement::{Move, ParseMoveError},
    oracle::{ChessOracle, IndexableBoard},
    session::{BlindSession, Phase},
    square::Square,
    store::MemoryStore,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Input {
    Help,
    Flip,
    Quit,
    Play(Color),
    Square(Square),
    Move(Move),
    Undo,
    Reset,
    Submit,
    ExportLog,
    Load(String),
}
impl Display for Input {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Input::Help => write!(f, "help")?,
            Input::Flip => write!(f, "flip")?,
            Input::Quit => write!(f, "quit")?,
            Input::Play(color) => write!(f, "play {color}")?,
            Input::Square(square) => write!(f, "{square}")?,
            Input::Move(movement) => write!(f, "{movement}")?,
            Input::Undo => write!(f, "undo")?,
            Input::Reset => write!(f, "reset")?,
            Input::Submit => write!(f, "submit")?,
            Input::ExportLog => write!(f, "log")?,
            Input::Load(path) => write!(f, "load {path}")?,
        }
        Ok(())
    }
}
impl FromStr for Input {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "help" => Ok(Input::Help),
            "flip" => Ok(Input::Flip),
            "quit" => Ok(Input::Quit),
            "undo" => Ok(Input::Undo),
            "reset" => Ok(Input::Reset),
            "submit" => Ok(Input::Submit),
            "log" => Ok(Input::ExportLog),
            s => {
                if let Some(color) = s.strip_prefix("play ") {
                    Ok(Input::Play(color.trim().parse()?))
                } else if let Some(path) = s.strip_prefix("load ") {
                    Ok(Input::Load(path.trim().to_string()))
                } else if let Ok(square) = s.parse() {
                    Ok(Input::Square(square))
                } else {
                    Ok(Input::Move(s.parse()?))
                }
            }
        }
    }
}
#[derive(Debug, Clone, PartialEq, Eq, Error)]
enum ParseInputError {
    #[error(transparent)]
    Color(#[from] ParseColorError),
    #[error(transparent)]
    Move(#[from] ParseMoveError),
}

type Session = BlindSession<ChessOracle, MemoryStore>;

/// Brings local state back in line with the store, the way a reconnecting
/// client would.
fn resync(session: &mut Session, error: &mut impl Write) -> io::Result<()> {
    let log = session.store().moves().to_vec();
    if let Err(err) = session.replay(&log) {
        writeln!(error, "Error: {err}")?;
    }
    Ok(())
}

#[allow(
    clippy::too_many_lines,
    reason = "further decomposition could potentially hurt readability"
)]
pub fn repl(mut session: Session) -> io::Result<()> {
    let input = stdin().lock();
    let mut output = stdout().lock();
    let mut error = stderr().lock();

    let mut lines = input.lines();

    let mut info = String::new();
    let mut view = session.color().unwrap_or(Color::White);
    let mut first_time = true;
    loop {
        let now = Instant::now();
        info.clear();
        match session.phase(now) {
            Phase::Uninitialized => {
                writeln!(&mut info, "pick a color with `play <color>`").unwrap();
            }
            Phase::Submitted => writeln!(&mut info, "moves submitted").unwrap(),
            phase => {
                let summary = session.summary();
                writeln!(
                    &mut info,
                    "{} moves made, {} left",
                    summary.total_moves,
                    session.remaining_moves()
                )
                .unwrap();
                if phase == Phase::ReadyToSubmit {
                    writeln!(&mut info, "ready to submit").unwrap();
                }
            }
        }
        if let Some(verdict) = session.last_verdict() {
            writeln!(&mut info, "last move rejected: {verdict}").unwrap();
        }
        if first_time {
            writeln!(&mut info, "type `help` for instructions").unwrap();
            first_time = false;
        }
        if let Some(position) = session.position() {
            writeln!(
                output,
                "{}",
                BoardDisplay {
                    board: position,
                    view,
                    feedback: &session.feedback(),
                    info: &info,
                },
            )?;
        } else {
            write!(output, "{info}")?;
        }
        loop {
            write!(output, "> ")?;
            output.flush()?;
            let Some(text) = lines.next() else {
                return Ok(());
            };
            let text = text?;
            let input = match text.trim().parse() {
                Ok(input) => input,
                Err(err) => {
                    writeln!(error, "Error: {err}")?;
                    writeln!(error, "for available command, enter `help`")?;
                    continue;
                }
            };
            let now = Instant::now();
            match input {
                Input::Help => {
                    writeln!(output, "play <color>   - take white or black")?;
                    writeln!(output, "flip           - flip the board")?;
                    writeln!(output, "e2             - view how many moves the piece has left")?;
                    writeln!(output, "e2e4           - play the move")?;
                    writeln!(output, "e7e8n          - move and promote (queen if omitted)")?;
                    writeln!(output, "undo           - take back the last move")?;
                    writeln!(output, "reset          - take back every move")?;
                    writeln!(output, "submit         - submit the blind moves")?;
                    writeln!(output, "log            - print the move log as json")?;
                    writeln!(output, "load <path>    - replay a json move log")?;
                    writeln!(output, "quit           - quit the game")?;
                    continue;
                }
                Input::Flip => view = !view,
                Input::Quit => return Ok(()),
                Input::Play(color) => {
                    if let Err(err) = session.assign_color(color) {
                        writeln!(error, "Error: {err}")?;
                        continue;
                    }
                    view = color;
                }
                Input::Square(square) => {
                    let Some(piece) = session
                        .position()
                        .and_then(|position| IndexableBoard::piece_on(position, square))
                        .filter(|piece| Some(piece.color()) == session.color())
                    else {
                        writeln!(error, "Error: None of your pieces is on {square}")?;
                        continue;
                    };
                    let made = session.engine().tracker().piece_move_count(square);
                    let left = session.engine().config().max_per_piece.saturating_sub(made);
                    writeln!(output, "{piece} on {square}: moved {made} times, {left} left")?;
                    continue;
                }
                Input::Move(movement) => {
                    let Some(piece) = session
                        .position()
                        .and_then(|position| IndexableBoard::piece_on(position, movement.from))
                    else {
                        writeln!(error, "Error: No piece found on {}", movement.from)?;
                        continue;
                    };
                    let Move { from, to, promotion } = movement;
                    let accepted = match promotion {
                        Some(promotion) => {
                            session.handle_drop_with_promotion(from, to, piece, promotion, now)
                        }
                        None => session.handle_drop(from, to, piece, now),
                    };
                    if !accepted && session.last_verdict().is_none() {
                        writeln!(error, "Error: {movement} was not accepted")?;
                    }
                }
                Input::Undo => {
                    if session.handle_undo() {
                        resync(&mut session, &mut error)?;
                    }
                }
                Input::Reset => {
                    if session.handle_reset() {
                        resync(&mut session, &mut error)?;
                    }
                }
                Input::Submit => {
                    if !session.handle_submit(now) {
                        writeln!(error, "Error: nothing to submit right now")?;
                    }
                }
                Input::ExportLog => {
                    match session.store().to_json() {
                        Ok(json) => writeln!(output, "{json}")?,
                        Err(err) => writeln!(error, "Error: {err}")?,
                    }
                    continue;
                }
                Input::Load(path) => {
                    let loaded = fs::read_to_string(&path)
                        .map_err(|err| err.to_string())
                        .and_then(|src| {
                            MemoryStore::from_json(&src).map_err(|err| err.to_string())
                        });
                    match loaded {
                        Ok(store) => {
                            *session.store_mut() = store;
                            resync(&mut session, &mut error)?;
                        }
                        Err(err) => {
                            writeln!(error, "Error: {err}")?;
                            continue;
                        }
                    }
                }
            }
            break;
        }
    }
}
