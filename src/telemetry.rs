//! Telemetry helpers for hosts embedding `chart-clock`.
//!
//! The crate only emits `tracing` events: lifecycle transitions at `debug`,
//! per-frame clock advancement at `trace`. Hosts either call
//! `init_default_tracing` or install their own subscriber and filters.

/// Installs a compact `tracing` subscriber when the `telemetry` feature is enabled.
///
/// The filter comes from `RUST_LOG` and falls back to `info`.
/// Returns `false` when the feature is disabled or a global subscriber was
/// already set by the host.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
