#![deny(warnings, clippy::all, clippy::pedantic)]

//! Line-oriented shell over a [`ChainedHashMap`](chained_map::ChainedHashMap) of strings.

pub mod command;
pub mod logger;
pub mod session;

pub use command::{Command, CommandError};
pub use session::Session;
