//! The read-eval-print loop.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chained_map::ChainedHashMap;
use log::{debug, info};

use crate::command::{Command, CommandError};

const WELCOME: &str = "Welcome to my Hash Map. Please enter a size for the hash map.";
const GOODBYE: &str = "Ending program! Goodbye!";
const HELP: &str = "\
Use \"set (key) (value)\" to set a key and value in the hash map.
Use \"get (key)\" to get a value corresponding to a key in the hash map.
Use \"delete (key)\" to delete a key,value pair from the hash map.
Use \"load\" to get the load on the hash map, elements/size.
Use \"r\" to restart the program.
Use \"x\" to exit the program.";

/// What the session does after a command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Flow {
    Continue,
    Restart,
    Exit,
}

/// A shell session reading commands from `input` and writing responses to `output`.
///
/// Each restart replaces the map with a new one of a freshly prompted size.
pub struct Session<R, W> {
    input: R,
    output: W,
    line: String,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Creates a new [`Session`].
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            line: String::new(),
        }
    }

    /// Runs the session until `x` is entered or the input ends.
    ///
    /// If `size` is given, the first map is built with it instead of prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the input or writing the output fails.
    pub fn run(&mut self, mut size: Option<usize>) -> Result<()> {
        writeln!(self.output, "{WELCOME}")?;
        loop {
            let size = match size.take() {
                Some(size) => size,
                None => match self.read_size()? {
                    Some(size) => size,
                    None => break,
                },
            };
            info!("starting a session with size {size}");
            let mut map = ChainedHashMap::new(size);
            writeln!(self.output, "{HELP}")?;
            if self.run_commands(&mut map)? == Flow::Exit {
                break;
            }
            debug!("restarting");
        }
        writeln!(self.output, "{GOODBYE}")?;
        self.output.flush().context("failed to flush the output")
    }

    /// Executes commands against `map` until a restart or an exit.
    fn run_commands(&mut self, map: &mut ChainedHashMap<String, String>) -> Result<Flow> {
        loop {
            if !self.prompt("Command:")? {
                return Ok(Flow::Exit);
            }
            let flow = match Command::parse(&self.line) {
                Ok(command) => execute(map, command, &mut self.output)?,
                Err(CommandError::Empty) => Flow::Continue,
                Err(e) => {
                    debug!("rejected input: {e}");
                    writeln!(self.output, "Bad command.")?;
                    Flow::Continue
                }
            };
            if flow != Flow::Continue {
                return Ok(flow);
            }
        }
    }

    /// Prompts until a valid size is read; `None` means the input ended.
    fn read_size(&mut self) -> Result<Option<usize>> {
        loop {
            if !self.prompt("Size:")? {
                return Ok(None);
            }
            match self.line.trim().parse::<usize>() {
                Ok(size) => return Ok(Some(size)),
                Err(e) => writeln!(self.output, "Invalid size: {e}.")?,
            }
        }
    }

    /// Writes the prompt and reads a line into `self.line`; `false` means the input ended.
    fn prompt(&mut self, prompt: &str) -> Result<bool> {
        write!(self.output, "{prompt}")?;
        self.output.flush().context("failed to flush the output")?;
        self.line.clear();
        let read = self
            .input
            .read_line(&mut self.line)
            .context("failed to read the input")?;
        Ok(read != 0)
    }
}

/// Applies a command to the map and writes the outcome.
fn execute<W: Write>(
    map: &mut ChainedHashMap<String, String>,
    command: Command<'_>,
    output: &mut W,
) -> Result<Flow> {
    match command {
        Command::Set { key, value } => {
            if map.set(key.to_owned(), value.to_owned()) {
                writeln!(output, "Set successful.")?;
            } else {
                writeln!(output, "Set failed.")?;
            }
        }
        Command::Get { key } => match map.get(key) {
            Some(value) => writeln!(output, "Get successful: {value}")?,
            None => writeln!(output, "Get failed.")?,
        },
        Command::Delete { key } => match map.delete(key) {
            Some(value) => writeln!(output, "Delete successful: {value}")?,
            None => writeln!(output, "Delete failed.")?,
        },
        Command::Load => match map.load() {
            Some(load) => writeln!(output, "{load:?}")?,
            None => writeln!(output, "Unable to load with size 0.")?,
        },
        Command::Restart => return Ok(Flow::Restart),
        Command::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}
