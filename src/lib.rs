//! Bot for a turn-based grid game of moving, pushing and building.
//!
//! Each turn the referee sends the board and the list of legal actions; the bot
//! answers with the action picked by a depth-limited alpha-beta search.

pub mod board;
pub mod bot;
pub mod protocol;
pub mod search;

pub use bot::{Bot, BotConfig, Reply};
