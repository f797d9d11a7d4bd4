//! Wire-transfer transaction record consumed by the screening core.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status attached by the upstream transfer system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected,
    Flagged,
}

/// A single customer credit transfer, as delivered on the transaction
/// subject alongside its raw MT103 text.
///
/// The record is consumed read-only by the validator and the scoring
/// engine. Country codes are not stored; they are derived from the BICs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    pub from_account: String,
    pub to_account: String,
    /// Amount in the transfer currency.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    pub from_bank_swift: String,
    pub to_bank_swift: String,
    pub from_bank_name: String,
    pub to_bank_name: String,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub from_iban: Option<String>,
    #[serde(default)]
    pub to_iban: Option<String>,
}

impl Transaction {
    /// Create a transaction with the fields the core cares about; bank
    /// names and IBANs start empty.
    pub fn new(
        transaction_id: &str,
        from_account: &str,
        to_account: &str,
        amount: Decimal,
        currency: &str,
    ) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            from_account: from_account.to_string(),
            to_account: to_account.to_string(),
            amount,
            currency: currency.to_string(),
            from_bank_swift: String::new(),
            to_bank_swift: String::new(),
            from_bank_name: String::new(),
            to_bank_name: String::new(),
            timestamp: Utc::now(),
            status: TransactionStatus::Pending,
            from_iban: None,
            to_iban: None,
        }
    }

    /// Country code at BIC positions 5-6 of the originating bank.
    pub fn from_country_code(&self) -> Option<&str> {
        bic_country(&self.from_bank_swift)
    }

    /// Country code at BIC positions 5-6 of the beneficiary bank.
    pub fn to_country_code(&self) -> Option<&str> {
        bic_country(&self.to_bank_swift)
    }

    /// True when both country codes are present and differ.
    pub fn is_cross_border(&self) -> bool {
        matches!(
            (self.from_country_code(), self.to_country_code()),
            (Some(from), Some(to)) if from != to
        )
    }
}

fn bic_country(bic: &str) -> Option<&str> {
    bic.get(4..6)
        .filter(|code| code.bytes().all(|b| b.is_ascii_uppercase()))
}
