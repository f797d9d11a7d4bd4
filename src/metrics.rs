//! Throughput and outcome metrics for the screening pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the pipeline.
///
/// Every consumed message lands in exactly one of `record_transaction`
/// (scored) or `record_validation_failure` (rejected).
pub struct PipelineMetrics {
    /// Total messages consumed
    pub transactions_processed: AtomicU64,
    /// Messages rejected by the field validator
    pub validation_failures: AtomicU64,
    /// Detection results that carried at least one alert
    pub alerts_generated: AtomicU64,
    /// Alerting results by risk level
    alerts_by_level: RwLock<HashMap<String, u64>>,
    /// Trigger counts by rule
    triggers_by_rule: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Risk scores bucketed by decade (0-9, 10-19, ..., 90-100)
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            transactions_processed: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            alerts_generated: AtomicU64::new(0),
            alerts_by_level: RwLock::new(HashMap::new()),
            triggers_by_rule: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored transaction.
    pub fn record_transaction(&self, processing_time: Duration, risk_score: u8) {
        self.transactions_processed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent samples.
            if times.len() > 10_000 {
                times.drain(0..5_000);
            }
        }

        let bucket = usize::from(risk_score / 10).min(9);
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a transaction rejected by validation.
    pub fn record_validation_failure(&self) {
        self.transactions_processed.fetch_add(1, Ordering::Relaxed);
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an alerting result.
    pub fn record_alert(&self, risk_level: &str) {
        self.alerts_generated.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_level) = self.alerts_by_level.write() {
            *by_level.entry(risk_level.to_string()).or_insert(0) += 1;
        }
    }

    /// Record a single rule trigger.
    pub fn record_trigger(&self, rule: &str) {
        if let Ok(mut by_rule) = self.triggers_by_rule.write() {
            *by_rule.entry(rule.to_string()).or_insert(0) += 1;
        }
    }

    /// Get processing time statistics.
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = match self.processing_times.read() {
            Ok(times) => times,
            Err(_) => return ProcessingStats::default(),
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: sorted[count - 1],
        }
    }

    /// Current throughput (transactions per second).
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.transactions_processed.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or([0; 10])
    }

    pub fn get_alerts_by_level(&self) -> HashMap<String, u64> {
        self.alerts_by_level
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn get_triggers_by_rule(&self) -> HashMap<String, u64> {
        self.triggers_by_rule
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    /// Print summary statistics.
    pub fn print_summary(&self) {
        let processed = self.transactions_processed.load(Ordering::Relaxed);
        let rejected = self.validation_failures.load(Ordering::Relaxed);
        let alerted = self.alerts_generated.load(Ordering::Relaxed);
        let alert_rate = if processed > 0 {
            (alerted as f64 / processed as f64) * 100.0
        } else {
            0.0
        };

        let stats = self.get_processing_stats();

        info!(
            processed,
            rejected,
            alerted,
            alert_rate = format!("{:.1}%", alert_rate),
            throughput = format!("{:.1} tx/s", self.get_throughput()),
            "Pipeline summary"
        );
        info!(
            mean_us = stats.mean_us,
            p50_us = stats.p50_us,
            p95_us = stats.p95_us,
            p99_us = stats.p99_us,
            "Processing time"
        );

        for (level, count) in self.get_alerts_by_level() {
            info!(level = %level, count, "Alerts by risk level");
        }
        for (rule, count) in self.get_triggers_by_rule() {
            info!(rule = %rule, count, "Triggers by rule");
        }

        let distribution = self.get_score_distribution();
        let total: u64 = distribution.iter().sum();
        if total > 0 {
            for (i, &count) in distribution.iter().enumerate() {
                let upper = if i == 9 { 100 } else { i * 10 + 9 };
                info!(
                    band = format!("{}-{}", i * 10, upper),
                    count,
                    share = format!("{:.1}%", (count as f64 / total as f64) * 100.0),
                    "Risk score distribution"
                );
            }
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic reporter that prints metric summaries.
pub struct MetricsReporter {
    metrics: std::sync::Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task.
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
