//! Parsing of shell input lines.

use thiserror::Error;

/// A parsed shell command borrowing its arguments from the input line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command<'l> {
    /// `set <key> <value>`
    Set {
        /// The key to set.
        key: &'l str,
        /// The value to store.
        value: &'l str,
    },
    /// `get <key>`
    Get {
        /// The key to look up.
        key: &'l str,
    },
    /// `delete <key>`
    Delete {
        /// The key to remove.
        key: &'l str,
    },
    /// `load`
    Load,
    /// `r`: starts over with a new map.
    Restart,
    /// `x`: leaves the shell.
    Exit,
}

/// Reasons a line is not a valid [`Command`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CommandError {
    /// The line holds no words.
    #[error("empty command")]
    Empty,
    /// The first word is not a command.
    #[error("unknown command `{0}`")]
    Unknown(String),
    /// The command was given the wrong number of arguments.
    #[error("`{command}` takes {expected} argument(s), got {actual}")]
    Arity {
        /// The command word.
        command: &'static str,
        /// The number of arguments the command takes.
        expected: usize,
        /// The number of arguments on the line.
        actual: usize,
    },
}

impl<'l> Command<'l> {
    /// Parses a whitespace-separated line.
    ///
    /// The command word is case-insensitive. `r` and `x` ignore any trailing words.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] if the line is blank, the command word is unknown or the number
    /// of arguments does not match the command.
    pub fn parse(line: &'l str) -> Result<Self, CommandError> {
        let words: Vec<&'l str> = line.split_whitespace().collect();
        let (first, args) = words.split_first().ok_or(CommandError::Empty)?;
        match first.to_ascii_lowercase().as_str() {
            "set" => match *args {
                [key, value] => Ok(Command::Set { key, value }),
                _ => Err(arity("set", 2, args)),
            },
            "get" => match *args {
                [key] => Ok(Command::Get { key }),
                _ => Err(arity("get", 1, args)),
            },
            "delete" => match *args {
                [key] => Ok(Command::Delete { key }),
                _ => Err(arity("delete", 1, args)),
            },
            "load" => match *args {
                [] => Ok(Command::Load),
                _ => Err(arity("load", 0, args)),
            },
            "r" => Ok(Command::Restart),
            "x" => Ok(Command::Exit),
            _ => Err(CommandError::Unknown((*first).to_owned())),
        }
    }
}

fn arity(command: &'static str, expected: usize, args: &[&str]) -> CommandError {
    CommandError::Arity {
        command,
        expected,
        actual: args.len(),
    }
}
