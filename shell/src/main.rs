use std::io;

use anyhow::Result;
use chained_map_shell::logger::initialize_logger;
use chained_map_shell::Session;
use clap::Parser;
use log::LevelFilter;

/// Interactive shell over a fixed-capacity chained hash map.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Size of the first map; it holds twice as many entries. Prompted for if omitted.
    #[arg(short, long)]
    size: Option<usize>,

    /// Log level of the map and the shell (off, error, warn, info, debug, trace).
    #[arg(short, long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let args = Args::parse();
    initialize_logger(args.log_level);

    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(stdin.lock(), stdout.lock()).run(args.size)
}
