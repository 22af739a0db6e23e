//! ## skimmer-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! One registry initialised at startup; verbosity comes from the CLI flag
//! unless `RUST_LOG` overrides it.

use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

pub struct EventLogger;

impl EventLogger {
    /// Initialises the global subscriber. `verbosity` maps 0..3 to
    /// warn/info/debug/trace; `RUST_LOG` wins when set.
    pub fn init(verbosity: u8) {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let default_level = match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_thread_names(true)
            .with_span_events(FmtSpan::NONE);

        let filter_layer = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .expect("default level is a valid filter");

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();

        info!(verbosity, "logging initialised");
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn log_lines_are_captured() {
        tracing::info!("document processed");
        assert!(logs_contain("document processed"));
    }
}
