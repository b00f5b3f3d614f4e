//! Logging initialisation via tracing-subscriber.

use color_eyre::eyre::{eyre, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise `level` (`"warn"`, `"info"`,
/// `"ned_core=debug"`, ...) is used.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| eyre!("invalid log level '{level}': {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| eyre!("failed to set subscriber: {e}"))?;

    Ok(())
}
