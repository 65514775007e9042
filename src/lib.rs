#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

#[macro_use]
pub mod square;

pub mod board_display;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod fuzz;
pub mod movement;
pub mod oracle;
pub mod piece;
pub mod repl;
pub mod session;
pub mod store;
pub mod tracker;
