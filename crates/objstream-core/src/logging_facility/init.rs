//! Logging initialization
//!
//! One subscriber per process. Hosts pick a profile when they wire up a
//! session; the `objstream` binary maps `--verbose` and `--log-json` onto it.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

use super::test_capture::init_test_capture;

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Readable lines including per-snapshot debug events
    Development,
    /// JSON lines with attempt and retry boundaries only
    Production,
    /// In-memory capture shared with [`init_test_capture`]
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call has an effect. Output goes to stderr so a rendered
/// tree or change list on stdout stays machine-readable.
///
/// `RUST_LOG` overrides the profile's default filter. Development logs
/// `snapshot reconciled` and `snapshot dropped` at debug level; Production
/// keeps the `stream_attempt` and `retry` start/end events and failures.
///
/// # Example
///
/// ```
/// use objstream_core::logging_facility::{init, Profile};
/// use objstream_core::{ReconciliationSession, StreamOptions};
///
/// init(Profile::Production);
/// let mut session = ReconciliationSession::new(StreamOptions::default());
/// session.start(None).unwrap();
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("objstream=debug")),
                )
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("objstream=info")),
                )
                .init();
        }
        Profile::Test => {
            init_test_capture();
        }
    });
}
