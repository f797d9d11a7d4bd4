//! Risk classification and the records emitted by the scoring engine.

use crate::detectors::DetectorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Composite risk band derived from the 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Band a clamped 0-100 score. The four bands partition the range
    /// exactly: 0-30, 31-70, 71-90, 91-100.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=30 => RiskLevel::Low,
            31..=70 => RiskLevel::Medium,
            71..=90 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Severity carried as metadata on each triggered rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

impl AlertSeverity {
    /// Severity tracks the configured rule weight.
    pub fn from_weight(weight: u8) -> Self {
        match weight {
            0..=9 => AlertSeverity::Low,
            10..=19 => AlertSeverity::Medium,
            _ => AlertSeverity::High,
        }
    }
}

/// One alert per triggered detector per transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAlert {
    /// Unique alert identifier.
    pub alert_id: String,
    /// Identity of the rule that fired.
    pub rule: DetectorKind,
    pub description: String,
    pub severity: AlertSeverity,
    /// Rule-specific context for the triage queue.
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl FraudAlert {
    pub fn new(
        rule: DetectorKind,
        description: &str,
        severity: AlertSeverity,
        details: String,
    ) -> Self {
        Self {
            alert_id: uuid::Uuid::new_v4().to_string(),
            rule,
            description: description.to_string(),
            severity,
            details,
            timestamp: Utc::now(),
        }
    }
}

/// Outcome of one full scoring-engine evaluation. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudDetectionResult {
    pub transaction_id: String,
    pub is_fraudulent: bool,
    /// Sum of triggered rule weights, clamped to 100.
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub alerts: Vec<FraudAlert>,
    pub detection_timestamp: DateTime<Utc>,
}

/// Record routed to the rejected-transaction store when validation fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedTransaction {
    pub transaction_id: String,
    pub errors: Vec<String>,
    pub rejected_at: DateTime<Utc>,
}
