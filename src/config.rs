//! Configuration for the screening pipeline.

use crate::detectors::DetectorKind;
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use config::{Config, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub detection: DetectorConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming transactions
    pub transaction_subject: String,
    /// Subject for outgoing fraud alerts
    pub alert_subject: String,
    /// Subject for transactions rejected by validation
    pub rejected_subject: String,
    /// Queue group so parallel pipeline instances split the subject
    #[serde(default = "default_queue_group")]
    pub queue_group: String,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrently processed transactions
    pub workers: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (compact, pretty)
    pub format: String,
}

fn default_queue_group() -> String {
    "wire-screening".to_string()
}

/// Per-detector toggles, weights, and thresholds.
///
/// Loaded once at startup and treated as read-only during evaluation; a hot
/// reload replaces the whole object through [`SharedDetectorConfig`], so an
/// in-flight evaluation never sees a partially-updated config.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    /// Risk score at or above which a transaction is marked fraudulent.
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: u8,
    #[serde(default)]
    pub enabled: EnabledDetectors,
    #[serde(default)]
    pub weights: DetectorWeights,
    /// Amounts strictly above this trigger the high-amount rule.
    #[serde(default = "default_high_amount_threshold")]
    pub high_amount_threshold: Decimal,
    /// Start of the business window (inclusive hour, 0-23).
    #[serde(default = "default_business_hours_start")]
    pub business_hours_start: u32,
    /// End of the business window (exclusive hour, 0-23).
    #[serde(default = "default_business_hours_end")]
    pub business_hours_end: u32,
    /// Floor above which exact multiples of 1000 count as round amounts.
    #[serde(default = "default_round_amount_floor")]
    pub round_amount_floor: Decimal,
    #[serde(default)]
    pub structuring: StructuringConfig,
    #[serde(default = "default_high_risk_countries")]
    pub high_risk_countries: Vec<String>,
    #[serde(default = "default_suspicious_keywords")]
    pub suspicious_keywords: Vec<String>,
    #[serde(default = "default_crypto_keywords")]
    pub crypto_keywords: Vec<String>,
}

/// One typed flag per detector variant; there is no string lookup that
/// could fall through to a default for an unrecognized rule name.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnabledDetectors {
    pub high_amount: bool,
    pub off_hours: bool,
    pub suspicious_remittance: bool,
    pub round_amount: bool,
    pub cross_border_high_risk: bool,
    pub structuring: bool,
    pub crypto_keywords: bool,
}

impl Default for EnabledDetectors {
    fn default() -> Self {
        Self {
            high_amount: true,
            off_hours: true,
            suspicious_remittance: true,
            round_amount: true,
            cross_border_high_risk: true,
            structuring: true,
            crypto_keywords: true,
        }
    }
}

/// Score contribution of each rule when it triggers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorWeights {
    pub high_amount: u8,
    pub off_hours: u8,
    pub suspicious_remittance: u8,
    pub round_amount: u8,
    pub cross_border_high_risk: u8,
    pub structuring: u8,
    pub crypto_keywords: u8,
}

impl Default for DetectorWeights {
    fn default() -> Self {
        Self {
            high_amount: 10,
            off_hours: 15,
            suspicious_remittance: 20,
            round_amount: 15,
            cross_border_high_risk: 8,
            structuring: 10,
            crypto_keywords: 10,
        }
    }
}

/// Thresholds for the structuring rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StructuringConfig {
    /// Lower edge of the just-under-reporting amount band (inclusive).
    pub range_start: Decimal,
    /// Regulatory reporting threshold; exclusive upper edge of the band.
    pub reporting_threshold: Decimal,
    /// Amount treated as deliberately threshold-shaped.
    pub suspicious_amount: Decimal,
    /// Sliding-window length for per-account frequency tracking.
    pub window_minutes: i64,
    /// Trigger when this many sub-threshold transfers land in the window.
    pub max_transactions: usize,
    /// Per-transfer ceiling for the frequency rule.
    pub amount_threshold: Decimal,
}

impl Default for StructuringConfig {
    fn default() -> Self {
        Self {
            range_start: dec!(9900),
            reporting_threshold: dec!(10000),
            suspicious_amount: dec!(9999.99),
            window_minutes: 60,
            max_transactions: 5,
            amount_threshold: dec!(1000),
        }
    }
}

fn default_decision_threshold() -> u8 {
    70
}

fn default_high_amount_threshold() -> Decimal {
    dec!(15000)
}

fn default_business_hours_start() -> u32 {
    6
}

fn default_business_hours_end() -> u32 {
    22
}

fn default_round_amount_floor() -> Decimal {
    dec!(10000)
}

fn default_high_risk_countries() -> Vec<String> {
    ["IR", "KP", "SY", "CU", "MM"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_suspicious_keywords() -> Vec<String> {
    [
        "cash", "urgent", "gift", "lottery", "prize", "winning", "charity", "donation",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_crypto_keywords() -> Vec<String> {
    [
        "bitcoin", "btc", "ethereum", "crypto", "wallet", "binance", "coinbase",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl DetectorConfig {
    pub fn is_enabled(&self, kind: DetectorKind) -> bool {
        match kind {
            DetectorKind::HighAmount => self.enabled.high_amount,
            DetectorKind::OffHours => self.enabled.off_hours,
            DetectorKind::SuspiciousRemittance => self.enabled.suspicious_remittance,
            DetectorKind::RoundAmount => self.enabled.round_amount,
            DetectorKind::CrossBorderHighRisk => self.enabled.cross_border_high_risk,
            DetectorKind::Structuring => self.enabled.structuring,
            DetectorKind::CryptoKeywords => self.enabled.crypto_keywords,
        }
    }

    pub fn weight(&self, kind: DetectorKind) -> u8 {
        match kind {
            DetectorKind::HighAmount => self.weights.high_amount,
            DetectorKind::OffHours => self.weights.off_hours,
            DetectorKind::SuspiciousRemittance => self.weights.suspicious_remittance,
            DetectorKind::RoundAmount => self.weights.round_amount,
            DetectorKind::CrossBorderHighRisk => self.weights.cross_border_high_risk,
            DetectorKind::Structuring => self.weights.structuring,
            DetectorKind::CryptoKeywords => self.weights.crypto_keywords,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            decision_threshold: default_decision_threshold(),
            enabled: EnabledDetectors::default(),
            weights: DetectorWeights::default(),
            high_amount_threshold: default_high_amount_threshold(),
            business_hours_start: default_business_hours_start(),
            business_hours_end: default_business_hours_end(),
            round_amount_floor: default_round_amount_floor(),
            structuring: StructuringConfig::default(),
            high_risk_countries: default_high_risk_countries(),
            suspicious_keywords: default_suspicious_keywords(),
            crypto_keywords: default_crypto_keywords(),
        }
    }
}

/// Handle for atomic detector-config hot reload.
///
/// Readers snapshot a complete config; a reload stores a whole new object.
/// An evaluation keeps the snapshot it started with, so a swap mid-flight
/// is never visible as partial field mutation.
#[derive(Debug, Default)]
pub struct SharedDetectorConfig {
    inner: ArcSwap<DetectorConfig>,
}

impl SharedDetectorConfig {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            inner: ArcSwap::from_pointee(config),
        }
    }

    pub fn snapshot(&self) -> Arc<DetectorConfig> {
        self.inner.load_full()
    }

    pub fn replace(&self, config: DetectorConfig) {
        self.inner.store(Arc::new(config));
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                transaction_subject: "wire.transactions".to_string(),
                alert_subject: "wire.fraud.alerts".to_string(),
                rejected_subject: "wire.rejected".to_string(),
                queue_group: default_queue_group(),
            },
            detection: DetectorConfig::default(),
            pipeline: PipelineConfig { workers: 4 },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
        }
    }
}
