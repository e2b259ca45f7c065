//! Logger setup.

use log::LevelFilter;

/// Initialise `env_logger` with `default_filter` unless `RUST_LOG` says otherwise.
///
/// Calling it twice is harmless; the second call keeps the first logger.
pub fn init_logging(default_filter: LevelFilter) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.format_timestamp_millis();

    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}

/// Level for the `--verbose` flag.
pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}
