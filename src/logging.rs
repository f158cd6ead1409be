use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Installs a subscriber printing to stderr, filtered by `RUST_LOG` or - when
/// that's not set - by `verbosity` (0 = warn, 1 = info, 2 = debug, more =
/// trace).
///
/// Panics if a global subscriber has been already installed.
pub fn init(verbosity: u8) {
    if let Err(err) = try_init(verbosity) {
        panic!("{:?}", err);
    }
}

/// Same as [`init()`], but returns an error instead of panicking when there's
/// already a global subscriber.
pub fn try_init(verbosity: u8) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("Couldn't initialize logging: {}", err))
}

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
