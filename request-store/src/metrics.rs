//! Metrics collection for observability
//!
//! Prometheus metrics for the swap desk, registered on a private registry
//! so that several desks can coexist in one process.
//!
//! # Metrics
//!
//! - `swap_direct_matches_total` - Direct matches returned
//! - `swap_cycles_found_total` - Swap chains returned
//! - `swap_downgrades_total` - Relationships marked no longer matching
//! - `swap_match_duration_seconds` - Histogram of match search latencies

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Direct matches returned
    pub direct_matches_total: IntCounter,

    /// Swap chains returned
    pub cycles_found_total: IntCounter,

    /// Relationships downgraded
    pub downgrades_total: IntCounter,

    /// Match search duration histogram
    pub match_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let direct_matches_total = IntCounter::new(
            "swap_direct_matches_total",
            "Direct matches returned",
        )?;
        registry.register(Box::new(direct_matches_total.clone()))?;

        let cycles_found_total = IntCounter::new(
            "swap_cycles_found_total",
            "Swap chains returned",
        )?;
        registry.register(Box::new(cycles_found_total.clone()))?;

        let downgrades_total = IntCounter::new(
            "swap_downgrades_total",
            "Relationships marked no longer matching",
        )?;
        registry.register(Box::new(downgrades_total.clone()))?;

        let match_duration = Histogram::with_opts(
            HistogramOpts::new(
                "swap_match_duration_seconds",
                "Histogram of match search latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0]),
        )?;
        registry.register(Box::new(match_duration.clone()))?;

        Ok(Self {
            direct_matches_total,
            cycles_found_total,
            downgrades_total,
            match_duration,
            registry,
        })
    }

    /// Record a direct match search
    pub fn record_direct_matches(&self, count: usize, duration_seconds: f64) {
        self.direct_matches_total.inc_by(count as u64);
        self.match_duration.observe(duration_seconds);
    }

    /// Record a cycle search
    pub fn record_cycles(&self, count: usize, duration_seconds: f64) {
        self.cycles_found_total.inc_by(count as u64);
        self.match_duration.observe(duration_seconds);
    }

    /// Record persisted downgrades
    pub fn record_downgrades(&self, count: usize) {
        self.downgrades_total.inc_by(count as u64);
    }

    /// Render all metrics in the Prometheus text format
    pub fn encode(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("direct_matches_total", &self.direct_matches_total.get())
            .field("cycles_found_total", &self.cycles_found_total.get())
            .field("downgrades_total", &self.downgrades_total.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_independent_registries() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();

        first.record_downgrades(2);
        assert_eq!(first.downgrades_total.get(), 2);
        assert_eq!(second.downgrades_total.get(), 0);
    }

    #[test]
    fn test_encode() {
        let metrics = Metrics::new().unwrap();
        metrics.record_direct_matches(3, 0.002);

        let text = metrics.encode().unwrap();
        assert!(text.contains("swap_direct_matches_total 3"));
        assert!(text.contains("swap_match_duration_seconds_count 1"));
    }
}
