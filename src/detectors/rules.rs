//! The concrete fraud rules.

use super::history::AccountHistory;
use super::{DetectorKind, FraudDetector};
use crate::config::DetectorConfig;
use crate::message::WireMessage;
use crate::types::transaction::Transaction;
use anyhow::Result;
use chrono::{Duration, Timelike};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Remittance information lives in field 70.
const REMITTANCE_TAG: &str = "70";

/// All seven rules in their canonical evaluation order. The order is part
/// of the contract: it fixes the alert order on every result.
pub fn default_detector_set(history: Arc<AccountHistory>) -> Vec<Box<dyn FraudDetector>> {
    vec![
        Box::new(HighAmountDetector),
        Box::new(OffHoursDetector),
        Box::new(SuspiciousRemittanceDetector),
        Box::new(RoundAmountDetector),
        Box::new(CrossBorderHighRiskDetector),
        Box::new(StructuringDetector::new(history)),
        Box::new(CryptoKeywordsDetector),
    ]
}

fn remittance_match<'a>(message: &WireMessage, keywords: &'a [String]) -> Option<&'a str> {
    let text = message.field(REMITTANCE_TAG)?.to_lowercase();
    keywords
        .iter()
        .find(|kw| text.contains(&kw.to_lowercase()))
        .map(String::as_str)
}

/// Flags transfers above the configured amount ceiling.
pub struct HighAmountDetector;

impl FraudDetector for HighAmountDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::HighAmount
    }

    fn description(&self) -> &'static str {
        "Transaction amount exceeds the high-amount threshold"
    }

    fn is_suspicious(
        &self,
        transaction: &Transaction,
        _message: &WireMessage,
        config: &DetectorConfig,
    ) -> Result<bool> {
        Ok(transaction.amount > config.high_amount_threshold)
    }

    fn details(
        &self,
        transaction: &Transaction,
        _message: &WireMessage,
        config: &DetectorConfig,
    ) -> String {
        format!(
            "amount {} {} exceeds threshold {}",
            transaction.amount, transaction.currency, config.high_amount_threshold
        )
    }
}

/// Flags transfers issued outside the business window.
pub struct OffHoursDetector;

impl FraudDetector for OffHoursDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::OffHours
    }

    fn description(&self) -> &'static str {
        "Transaction issued outside business hours"
    }

    fn is_suspicious(
        &self,
        transaction: &Transaction,
        _message: &WireMessage,
        config: &DetectorConfig,
    ) -> Result<bool> {
        let hour = transaction.timestamp.hour();
        Ok(hour < config.business_hours_start || hour >= config.business_hours_end)
    }

    fn details(
        &self,
        transaction: &Transaction,
        _message: &WireMessage,
        config: &DetectorConfig,
    ) -> String {
        format!(
            "issued at hour {:02}, business window {:02}:00-{:02}:00",
            transaction.timestamp.hour(),
            config.business_hours_start,
            config.business_hours_end
        )
    }
}

/// Flags remittance text matching the monitored keyword list.
pub struct SuspiciousRemittanceDetector;

impl FraudDetector for SuspiciousRemittanceDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::SuspiciousRemittance
    }

    fn description(&self) -> &'static str {
        "Remittance information matches a monitored keyword"
    }

    fn is_suspicious(
        &self,
        _transaction: &Transaction,
        message: &WireMessage,
        config: &DetectorConfig,
    ) -> Result<bool> {
        Ok(remittance_match(message, &config.suspicious_keywords).is_some())
    }

    fn details(
        &self,
        _transaction: &Transaction,
        message: &WireMessage,
        config: &DetectorConfig,
    ) -> String {
        match remittance_match(message, &config.suspicious_keywords) {
            Some(keyword) => format!("remittance text contains '{keyword}'"),
            None => "remittance text matched a monitored keyword".to_string(),
        }
    }
}

/// Flags exact threshold-shaped figures and large round multiples of 1000.
pub struct RoundAmountDetector;

const EXACT_ROUND_FIGURES: [i64; 4] = [999, 9_999, 99_999, 999_999];

impl FraudDetector for RoundAmountDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::RoundAmount
    }

    fn description(&self) -> &'static str {
        "Transaction amount is a round figure at a suspicious magnitude"
    }

    fn is_suspicious(
        &self,
        transaction: &Transaction,
        _message: &WireMessage,
        config: &DetectorConfig,
    ) -> Result<bool> {
        let amount = transaction.amount;
        if EXACT_ROUND_FIGURES
            .iter()
            .any(|&figure| amount == Decimal::from(figure))
        {
            return Ok(true);
        }
        Ok(amount >= config.round_amount_floor && amount % Decimal::from(1000) == Decimal::ZERO)
    }

    fn details(
        &self,
        transaction: &Transaction,
        _message: &WireMessage,
        _config: &DetectorConfig,
    ) -> String {
        format!(
            "amount {} {} is an exact round figure",
            transaction.amount, transaction.currency
        )
    }
}

/// Flags cross-border transfers touching a high-risk country.
pub struct CrossBorderHighRiskDetector;

impl FraudDetector for CrossBorderHighRiskDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::CrossBorderHighRisk
    }

    fn description(&self) -> &'static str {
        "Cross-border transfer touching a high-risk country"
    }

    fn is_suspicious(
        &self,
        transaction: &Transaction,
        _message: &WireMessage,
        config: &DetectorConfig,
    ) -> Result<bool> {
        if !transaction.is_cross_border() {
            return Ok(false);
        }
        let high_risk = |code: &str| {
            config
                .high_risk_countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(code))
        };
        Ok(transaction.from_country_code().is_some_and(high_risk)
            || transaction.to_country_code().is_some_and(high_risk))
    }

    fn details(
        &self,
        transaction: &Transaction,
        _message: &WireMessage,
        _config: &DetectorConfig,
    ) -> String {
        format!(
            "corridor {}->{}",
            transaction.from_country_code().unwrap_or("??"),
            transaction.to_country_code().unwrap_or("??")
        )
    }
}

/// Flags amounts shaped to stay under the reporting threshold, and bursts
/// of small transfers from one account inside the sliding window.
pub struct StructuringDetector {
    history: Arc<AccountHistory>,
}

impl StructuringDetector {
    pub fn new(history: Arc<AccountHistory>) -> Self {
        Self { history }
    }
}

impl FraudDetector for StructuringDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Structuring
    }

    fn description(&self) -> &'static str {
        "Amount or transfer pattern shaped to evade the reporting threshold"
    }

    fn is_suspicious(
        &self,
        transaction: &Transaction,
        _message: &WireMessage,
        config: &DetectorConfig,
    ) -> Result<bool> {
        let s = &config.structuring;
        // The window is updated on every call so later transfers see the
        // full picture even when this one already trips the range check.
        let recent = self.history.record_and_count_below(
            &transaction.from_account,
            transaction.timestamp,
            transaction.amount,
            Duration::minutes(s.window_minutes),
            s.amount_threshold,
        );
        let in_band =
            transaction.amount >= s.range_start && transaction.amount < s.reporting_threshold;
        Ok(in_band || transaction.amount == s.suspicious_amount || recent >= s.max_transactions)
    }

    fn details(
        &self,
        transaction: &Transaction,
        _message: &WireMessage,
        config: &DetectorConfig,
    ) -> String {
        format!(
            "amount {} from account {} fits a structuring profile (reporting threshold {})",
            transaction.amount, transaction.from_account, config.structuring.reporting_threshold
        )
    }
}

/// Flags remittance text mentioning cryptocurrency.
pub struct CryptoKeywordsDetector;

impl FraudDetector for CryptoKeywordsDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::CryptoKeywords
    }

    fn description(&self) -> &'static str {
        "Remittance information mentions cryptocurrency"
    }

    fn is_suspicious(
        &self,
        _transaction: &Transaction,
        message: &WireMessage,
        config: &DetectorConfig,
    ) -> Result<bool> {
        Ok(remittance_match(message, &config.crypto_keywords).is_some())
    }

    fn details(
        &self,
        _transaction: &Transaction,
        message: &WireMessage,
        config: &DetectorConfig,
    ) -> String {
        match remittance_match(message, &config.crypto_keywords) {
            Some(keyword) => format!("remittance text contains '{keyword}'"),
            None => "remittance text mentions cryptocurrency".to_string(),
        }
    }
}
