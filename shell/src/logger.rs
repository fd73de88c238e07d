use env_logger::Builder;
use log::LevelFilter;

/// Installs the global logger for the map and the shell at `level`; other crates stay at `warn`.
///
/// `RUST_LOG` is applied last and overrides `level`. Returns `false` if a logger was already
/// installed.
pub fn initialize_logger(level: LevelFilter) -> bool {
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("chained_map", level)
        .filter_module("chained_map_shell", level)
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .try_init()
        .is_ok()
}
