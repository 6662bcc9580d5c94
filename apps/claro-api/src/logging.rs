//! Structured JSON logging setup using tracing.
//!
//! This module initializes the tracing subscriber with JSON output format
//! suitable for log aggregation systems like ELK, Datadog, or CloudWatch.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber with JSON logging.
///
/// # Arguments
///
/// * `filter` - The log filter directive (e.g., "info,claro=debug")
///
/// # Panics
///
/// Panics if the subscriber has already been initialized.
pub fn init_logging(filter: &str) {
    let filter_layer =
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(filter)) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("FATAL: Failed to create log filter: {e}");
                std::process::exit(1);
            }
        };

    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .init();

    tracing::info!(filter = %filter, "Logging initialized");
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_test_logging_does_not_panic() {
        // Multiple try_init calls must be safe in the test harness
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }
}
