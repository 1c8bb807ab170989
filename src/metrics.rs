//! Pipeline metrics
//!
//! Counters and histograms for the extraction and validation phases. They are
//! exported over HTTP only when `init_metrics` finds a listen address in the
//! environment; otherwise the calls are no-ops.

use std::net::SocketAddr;
use std::sync::Once;
use tracing::{debug, info, warn};

use crate::constants::METRICS_ADDR_ENV;

static INIT: Once = Once::new();

macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("cricket_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("cricket_", $phase, "_", $name)
    };
}

fn metrics_addr() -> Option<String> {
    std::env::var(METRICS_ADDR_ENV)
        .ok()
        .or_else(|| std::env::var("PROMETHEUS_ADDR").ok())
        .filter(|addr| !addr.trim().is_empty())
}

/// Install the Prometheus recorder and HTTP exporter if `CRICKET_METRICS_ADDR`
/// (or `PROMETHEUS_ADDR`) is set. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| {
        let Some(addr_str) = metrics_addr() else {
            debug!("No metrics address configured, metrics stay in-process");
            return;
        };

        let addr = match addr_str.trim().parse::<SocketAddr>() {
            Ok(addr) => addr,
            Err(e) => {
                warn!("Invalid metrics addr '{}': {}", addr_str, e);
                return;
            }
        };

        match metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
        {
            Ok(()) => info!("Prometheus exporter listening at http://{}/metrics", addr),
            Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
        }
    });
}

/// Metrics for the validation pipeline
pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_stage(stage: &'static str, rows_in: usize, rows_out: usize, affected: usize) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "rows_dropped"), "stage" => stage)
            .increment(rows_in.saturating_sub(rows_out) as u64);
        ::metrics::counter!(phase_metric!(counter, "pipeline", "rows_affected"), "stage" => stage)
            .increment(affected as u64);
    }

    pub fn record_run(rows_before: usize, rows_after: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "runs")).increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "pipeline", "rows_in")).record(rows_before as f64);
        ::metrics::histogram!(phase_metric!(histogram, "pipeline", "rows_out")).record(rows_after as f64);
        ::metrics::histogram!(phase_metric!(histogram, "pipeline", "duration_seconds")).record(duration_secs);
    }
}

/// Metrics for record extraction
pub struct ExtractionMetrics;

impl ExtractionMetrics {
    pub fn record_batch(format: &'static str, files: usize, kept: usize, unreadable: usize) {
        ::metrics::counter!(phase_metric!(counter, "extract", "files_seen"), "format" => format)
            .increment(files as u64);
        ::metrics::counter!(phase_metric!(counter, "extract", "matches_kept"), "format" => format)
            .increment(kept as u64);
        ::metrics::counter!(phase_metric!(counter, "extract", "unreadable_files"), "format" => format)
            .increment(unreadable as u64);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::capture;
    use super::*;

    #[test]
    fn test_stage_counters() {
        let captured = capture(|| {
            PipelineMetrics::record_stage("remove_duplicates", 10, 7, 3);
            PipelineMetrics::record_stage("remove_duplicates", 7, 7, 0);
            PipelineMetrics::record_stage("classify_home_away", 7, 7, 4);
        });

        assert_eq!(
            captured.counter("cricket_pipeline_rows_dropped_total", "stage", "remove_duplicates"),
            Some(3)
        );
        assert_eq!(
            captured.counter("cricket_pipeline_rows_affected_total", "stage", "classify_home_away"),
            Some(4)
        );
    }

    #[test]
    fn test_extraction_counters() {
        let captured = capture(|| ExtractionMetrics::record_batch("ODI", 12, 9, 1));
        assert_eq!(
            captured.counter("cricket_extract_files_seen_total", "format", "ODI"),
            Some(12)
        );
        assert_eq!(
            captured.counter("cricket_extract_unreadable_files_total", "format", "ODI"),
            Some(1)
        );
    }

    #[test]
    fn test_phase_metric_names() {
        assert_eq!(phase_metric!(counter, "pipeline", "runs"), "cricket_pipeline_runs_total");
        assert_eq!(
            phase_metric!(histogram, "pipeline", "duration_seconds"),
            "cricket_pipeline_duration_seconds"
        );
    }
}
