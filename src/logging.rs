//! Logging setup and the error sink.
//!
//! Diagnostics go through `tracing`; stderr output is filtered by `RUST_LOG`
//! (default `warn`) so the JSON printed on stdout stays clean.

use anyhow::{Result, anyhow};
use std::error::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// # Errors
/// Returns an error if a subscriber has already been installed.
pub fn init() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow!("failed to initialize tracing: {}", e))
}

/// Destination for failures worth keeping a record of.
///
/// `trace` is the full error chain, `title` a short category label such as
/// `"Git Push Failed"`. Callers redact secrets before logging.
pub trait ErrorSink {
    fn log_error(&self, trace: &str, title: &str);
}

/// Error sink that forwards to `tracing::error!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn log_error(&self, trace: &str, title: &str) {
        tracing::error!(title, trace, "operation failed");
    }
}

/// Render an error and its `source()` chain, one cause per line.
pub fn error_chain(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut cur = err.source();
    while let Some(cause) = cur {
        out.push_str("\ncaused by: ");
        out.push_str(&cause.to_string());
        cur = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Leaf;
    impl fmt::Display for Leaf {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }
    impl Error for Leaf {}

    #[derive(Debug)]
    struct Outer(Leaf);
    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("push failed")
        }
    }
    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn chain_lists_every_cause() {
        assert_eq!(
            error_chain(&Outer(Leaf)),
            "push failed\ncaused by: connection refused"
        );
    }

    #[test]
    fn init_twice_does_not_panic() {
        let _ = init();
        assert!(init().is_err());
        TracingSink.log_error("trace", "Title");
    }
}
