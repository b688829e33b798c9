//! Observability for aggc
//!
//! Logging goes through `tracing`. Library code only emits events; the
//! binary decides where they go by installing a subscriber with
//! [`init_logging`].
//!
//! # Usage
//!
//! ```ignore
//! use aggc::observability::{init_logging, Event};
//!
//! init_logging(tracing::Level::INFO);
//! tracing::info!(event = %Event::CatalogLoaded, aggregations = 12);
//! ```

mod events;

pub use events::Event;

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `level` when set. Returns false if a
/// global subscriber was already installed.
pub fn init_logging(level: Level) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        // First call may or may not win depending on test ordering
        let _ = init_logging(Level::DEBUG);
        assert!(!init_logging(Level::DEBUG));
    }
}
