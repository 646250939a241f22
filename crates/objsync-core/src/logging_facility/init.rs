//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output, change events included
    Development,
    /// JSON structured output for production
    Production,
    /// Bare registry; tests attach a capture layer via `init_test_capture()`
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is not set
    pub fn default_directives(&self) -> &'static str {
        match self {
            Profile::Development => "objsync_core=debug,objsync_store=debug",
            Profile::Production => "objsync_core=info,objsync_store=info",
            Profile::Test => "off",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once at application startup; later calls are no-ops, as is a call
/// made after another global subscriber was installed. `RUST_LOG`
/// overrides the profile's default filter.
///
/// Change events are emitted at debug level, so `Production` hides them
/// unless `RUST_LOG` enables debug for `objsync_core`.
///
/// # Example
///
/// ```
/// use objsync_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = || {
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(profile.default_directives()))
        };
        match profile {
            Profile::Development => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(filter())
                    .try_init();
            }
            Profile::Production => {
                let _ = tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter())
                    .try_init();
            }
            Profile::Test => {
                let _ = tracing_subscriber::registry().try_init();
            }
        }
    });
}
