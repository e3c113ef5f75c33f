//! Tracing-subscriber initialisation for the TeleOS processes.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `TELEOS_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global `tracing` subscriber.
///
/// Compact console output by default; newline-delimited JSON (suitable for
/// log aggregators) when `TELEOS_LOG_FORMAT=json`.  Calling it a second time
/// in the same process is a no-op.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var("TELEOS_LOG_FORMAT").as_deref() == Ok("json");

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()
    };
    // Already-initialised is fine (tests, embedding hosts).
    let _ = result;
}
