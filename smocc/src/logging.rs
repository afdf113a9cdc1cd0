use env_logger::{Builder, Env};
use log::LevelFilter;

/// Game log level for a run. Other crates stay at warnings.
fn game_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Sets up `env_logger` for the game. `RUST_LOG` is applied last and
/// overrides the defaults.
pub fn init(verbose: bool) {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_CRATE_NAME"), game_level(verbose))
        .format_timestamp_millis()
        .parse_env(Env::default());

    // A second call finds the logger already installed.
    let _ = builder.try_init();
}
