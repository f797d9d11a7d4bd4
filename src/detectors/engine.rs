//! Composite scoring over the enabled detector set.

use super::history::AccountHistory;
use super::rules::default_detector_set;
use super::{DetectorOutcome, FraudDetector};
use crate::config::{DetectorConfig, SharedDetectorConfig};
use crate::message::WireMessage;
use crate::types::alert::{AlertSeverity, FraudAlert, FraudDetectionResult, RiskLevel};
use crate::types::transaction::Transaction;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Risk scores are clamped to this ceiling.
const MAX_RISK_SCORE: u32 = 100;

/// Runs the enabled detectors in a stable order and folds their verdicts
/// into one [`FraudDetectionResult`].
pub struct ScoringEngine {
    detectors: Vec<Box<dyn FraudDetector>>,
    config: Arc<SharedDetectorConfig>,
}

impl ScoringEngine {
    /// Engine with the full default rule set.
    pub fn new(config: Arc<SharedDetectorConfig>) -> Self {
        let history = Arc::new(AccountHistory::new());
        Self::with_detectors(default_detector_set(history), config)
    }

    /// Engine over an explicit detector list; list order is alert order.
    pub fn with_detectors(
        detectors: Vec<Box<dyn FraudDetector>>,
        config: Arc<SharedDetectorConfig>,
    ) -> Self {
        Self { detectors, config }
    }

    /// Evaluate one transaction against the current config snapshot.
    ///
    /// The snapshot is taken once per call, so a concurrent hot reload is
    /// never visible as partial field mutation. A disabled detector is
    /// skipped entirely; a failing detector is logged and scored as not
    /// triggered while the remaining detectors still run.
    pub fn evaluate(
        &self,
        transaction: &Transaction,
        message: &WireMessage,
    ) -> FraudDetectionResult {
        let config = self.config.snapshot();
        let mut score: u32 = 0;
        let mut alerts = Vec::new();

        for detector in &self.detectors {
            if !config.is_enabled(detector.kind()) {
                continue;
            }
            match run_detector(detector.as_ref(), transaction, message, &config) {
                DetectorOutcome::Triggered(alert) => {
                    score += u32::from(config.weight(detector.kind()));
                    alerts.push(alert);
                }
                DetectorOutcome::Clear => {}
                DetectorOutcome::Failed(error) => {
                    warn!(
                        transaction_id = %transaction.transaction_id,
                        rule = detector.kind().as_str(),
                        error = %error,
                        "Detector failed; scored as not triggered"
                    );
                }
            }
        }

        let risk_score = score.min(MAX_RISK_SCORE) as u8;
        let risk_level = RiskLevel::from_score(risk_score);
        let is_fraudulent = risk_score >= config.decision_threshold;

        debug!(
            transaction_id = %transaction.transaction_id,
            risk_score,
            risk_level = ?risk_level,
            alerts = alerts.len(),
            "Evaluation complete"
        );

        FraudDetectionResult {
            transaction_id: transaction.transaction_id.clone(),
            is_fraudulent,
            risk_score,
            risk_level,
            alerts,
            detection_timestamp: Utc::now(),
        }
    }
}

fn run_detector(
    detector: &dyn FraudDetector,
    transaction: &Transaction,
    message: &WireMessage,
    config: &DetectorConfig,
) -> DetectorOutcome {
    match detector.is_suspicious(transaction, message, config) {
        Ok(true) => {
            let weight = config.weight(detector.kind());
            DetectorOutcome::Triggered(FraudAlert::new(
                detector.kind(),
                detector.description(),
                AlertSeverity::from_weight(weight),
                detector.details(transaction, message, config),
            ))
        }
        Ok(false) => DetectorOutcome::Clear,
        Err(error) => DetectorOutcome::Failed(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnabledDetectors;
    use crate::detectors::rules::RoundAmountDetector;
    use crate::detectors::DetectorKind;
    use anyhow::anyhow;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn engine(config: DetectorConfig) -> ScoringEngine {
        ScoringEngine::new(Arc::new(SharedDetectorConfig::new(config)))
    }

    fn none_enabled() -> EnabledDetectors {
        EnabledDetectors {
            high_amount: false,
            off_hours: false,
            suspicious_remittance: false,
            round_amount: false,
            cross_border_high_risk: false,
            structuring: false,
            crypto_keywords: false,
        }
    }

    fn daytime_tx(amount: Decimal) -> Transaction {
        let mut tx = Transaction::new("tx_001", "ACC1", "ACC2", amount, "EUR");
        tx.from_bank_swift = "COBADEFF".to_string();
        tx.to_bank_swift = "DEUTDEFFXXX".to_string();
        tx.timestamp = Utc.with_ymd_and_hms(2025, 6, 22, 14, 30, 0).unwrap();
        tx
    }

    #[test]
    fn test_high_amount_alone_scores_its_weight() {
        let mut config = DetectorConfig::default();
        config.enabled = none_enabled();
        config.enabled.high_amount = true;

        let result = engine(config).evaluate(&daytime_tx(dec!(20000)), &WireMessage::default());

        assert_eq!(result.risk_score, 10);
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(!result.is_fraudulent);
        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].rule, DetectorKind::HighAmount);
    }

    #[test]
    fn test_round_amount_alone_on_999999() {
        let mut config = DetectorConfig::default();
        config.enabled = none_enabled();
        config.enabled.round_amount = true;

        let result = engine(config).evaluate(&daytime_tx(dec!(999999)), &WireMessage::default());

        assert_eq!(result.risk_score, 15);
        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].rule, DetectorKind::RoundAmount);
    }

    /// A transfer built to trip every rule at once: huge exact round
    /// figure, off-hours, loaded remittance text, DE->IR corridor, and a
    /// history of five small transfers from the same account.
    fn all_rules_scenario(engine: &ScoringEngine) -> FraudDetectionResult {
        let message = WireMessage::parse("{4:\n:70:URGENT cash gift via bitcoin wallet\n-}");

        for minute in 0..5 {
            let mut small = daytime_tx(dec!(400));
            small.timestamp = Utc.with_ymd_and_hms(2025, 6, 22, 22, 5 + minute, 0).unwrap();
            engine.evaluate(&small, &WireMessage::default());
        }

        let mut tx = daytime_tx(dec!(999999));
        tx.to_bank_swift = "BKMTIRTH".to_string();
        tx.timestamp = Utc.with_ymd_and_hms(2025, 6, 22, 22, 30, 0).unwrap();
        engine.evaluate(&tx, &message)
    }

    #[test]
    fn test_all_rules_triggered_sums_default_weights() {
        let result = all_rules_scenario(&engine(DetectorConfig::default()));

        assert_eq!(result.alerts.len(), 7);
        assert_eq!(result.risk_score, 88);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert!(result.is_fraudulent);

        // Alert order matches the canonical detector order.
        let rules: Vec<DetectorKind> = result.alerts.iter().map(|a| a.rule).collect();
        assert_eq!(
            rules,
            vec![
                DetectorKind::HighAmount,
                DetectorKind::OffHours,
                DetectorKind::SuspiciousRemittance,
                DetectorKind::RoundAmount,
                DetectorKind::CrossBorderHighRisk,
                DetectorKind::Structuring,
                DetectorKind::CryptoKeywords,
            ]
        );
    }

    #[test]
    fn test_score_clamps_at_100_under_adversarial_weights() {
        let mut config = DetectorConfig::default();
        config.weights.high_amount = 40;
        config.weights.off_hours = 40;
        config.weights.suspicious_remittance = 40;
        config.weights.round_amount = 40;
        config.weights.cross_border_high_risk = 40;
        config.weights.structuring = 40;
        config.weights.crypto_keywords = 40;

        let result = all_rules_scenario(&engine(config));

        assert_eq!(result.alerts.len(), 7);
        assert_eq!(result.risk_score, 100);
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert!(result.is_fraudulent);
    }

    #[test]
    fn test_disabled_detector_contributes_nothing() {
        let mut config = DetectorConfig::default();
        config.enabled.high_amount = false;

        // 17500 would trip the high-amount rule and nothing else.
        let result = engine(config).evaluate(&daytime_tx(dec!(17500)), &WireMessage::default());

        assert_eq!(result.risk_score, 0);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn test_decision_threshold_marks_fraudulent() {
        let mut config = DetectorConfig::default();
        config.enabled = none_enabled();
        config.enabled.high_amount = true;
        config.weights.high_amount = 70;

        let result = engine(config).evaluate(&daytime_tx(dec!(20000)), &WireMessage::default());
        assert_eq!(result.risk_score, 70);
        assert!(result.is_fraudulent);
    }

    #[test]
    fn test_reevaluation_is_deterministic() {
        let mut config = DetectorConfig::default();
        // Keep the structuring window out of it; history grows per call.
        config.enabled.structuring = false;

        let eng = engine(config);
        let tx = daytime_tx(dec!(20000));
        let message = WireMessage::parse("{4:\n:70:urgent bitcoin purchase\n-}");

        let first = eng.evaluate(&tx, &message);
        let second = eng.evaluate(&tx, &message);

        assert_eq!(first.risk_score, second.risk_score);
        assert_eq!(first.risk_level, second.risk_level);
        assert_eq!(first.is_fraudulent, second.is_fraudulent);
        assert_eq!(first.alerts.len(), second.alerts.len());
        for (a, b) in first.alerts.iter().zip(&second.alerts) {
            // Identical up to the generated alert id and timestamps.
            assert_eq!(a.rule, b.rule);
            assert_eq!(a.description, b.description);
            assert_eq!(a.severity, b.severity);
            assert_eq!(a.details, b.details);
        }
    }

    struct FailingDetector;

    impl FraudDetector for FailingDetector {
        fn kind(&self) -> DetectorKind {
            DetectorKind::HighAmount
        }

        fn description(&self) -> &'static str {
            "always fails"
        }

        fn is_suspicious(
            &self,
            _transaction: &Transaction,
            _message: &WireMessage,
            _config: &DetectorConfig,
        ) -> anyhow::Result<bool> {
            Err(anyhow!("internal detector error"))
        }

        fn details(
            &self,
            _transaction: &Transaction,
            _message: &WireMessage,
            _config: &DetectorConfig,
        ) -> String {
            String::new()
        }
    }

    #[test]
    fn test_detector_failure_is_isolated() {
        let shared = Arc::new(SharedDetectorConfig::new(DetectorConfig::default()));
        let eng = ScoringEngine::with_detectors(
            vec![Box::new(FailingDetector), Box::new(RoundAmountDetector)],
            shared,
        );

        let result = eng.evaluate(&daytime_tx(dec!(999999)), &WireMessage::default());

        // The failure is swallowed; the round-amount rule still scores.
        assert_eq!(result.risk_score, 15);
        assert_eq!(result.alerts.len(), 1);
        assert_eq!(result.alerts[0].rule, DetectorKind::RoundAmount);
    }

    #[test]
    fn test_config_snapshot_per_evaluation() {
        let shared = Arc::new(SharedDetectorConfig::new(DetectorConfig::default()));
        let eng = ScoringEngine::new(shared.clone());

        let before = eng.evaluate(&daytime_tx(dec!(17500)), &WireMessage::default());
        assert_eq!(before.risk_score, 10);

        let mut reloaded = DetectorConfig::default();
        reloaded.enabled.high_amount = false;
        shared.replace(reloaded);

        let after = eng.evaluate(&daytime_tx(dec!(17500)), &WireMessage::default());
        assert_eq!(after.risk_score, 0);
    }
}
