//! Rule-based fraud detectors and the engine that combines them.

pub mod engine;
pub mod history;
pub mod rules;

use crate::config::DetectorConfig;
use crate::message::WireMessage;
use crate::types::alert::FraudAlert;
use crate::types::transaction::Transaction;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Identity of each fraud rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorKind {
    HighAmount,
    OffHours,
    SuspiciousRemittance,
    RoundAmount,
    CrossBorderHighRisk,
    Structuring,
    CryptoKeywords,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::HighAmount => "high_amount",
            DetectorKind::OffHours => "off_hours",
            DetectorKind::SuspiciousRemittance => "suspicious_remittance",
            DetectorKind::RoundAmount => "round_amount",
            DetectorKind::CrossBorderHighRisk => "cross_border_high_risk",
            DetectorKind::Structuring => "structuring",
            DetectorKind::CryptoKeywords => "crypto_keywords",
        }
    }
}

/// Capability shared by all fraud rules.
///
/// Detectors hold no per-call state; the structuring rule's per-account
/// window is the single sanctioned exception and lives behind its own
/// lock. Weights and toggles belong to [`DetectorConfig`], keyed by
/// [`DetectorKind`].
pub trait FraudDetector: Send + Sync {
    fn kind(&self) -> DetectorKind;

    /// Rule description used on alerts.
    fn description(&self) -> &'static str;

    /// Whether the rule fires for this transaction.
    fn is_suspicious(
        &self,
        transaction: &Transaction,
        message: &WireMessage,
        config: &DetectorConfig,
    ) -> Result<bool>;

    /// Alert details for a triggered rule.
    fn details(
        &self,
        transaction: &Transaction,
        message: &WireMessage,
        config: &DetectorConfig,
    ) -> String;
}

/// Outcome of one detector call as seen by the scoring engine.
///
/// A failed detector never unwinds past the engine boundary; it is logged
/// and scored as if it had not triggered.
#[derive(Debug)]
pub enum DetectorOutcome {
    Triggered(FraudAlert),
    Clear,
    Failed(anyhow::Error),
}
