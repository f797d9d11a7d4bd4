//! Syntax validation of raw wire-message text.
//!
//! Four independent checks run unconditionally and their errors are
//! concatenated; validation never short-circuits and never fails outright,
//! no matter how malformed the input is.

use crate::message::WireMessage;
use crate::types::transaction::Transaction;

/// Tags every MT103 must carry, with the field name used in errors.
pub const MANDATORY_TAGS: [(&str, &str); 3] = [
    ("20", "sender reference"),
    ("23B", "bank operation code"),
    ("32A", "value date/currency/amount"),
];

/// Tags whose value is a BIC when present.
const BIC_TAGS: [&str; 3] = ["52A", "56A", "57A"];

/// Accumulated validation errors; empty means the message is well-formed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    fn push(&mut self, error: String) {
        self.errors.push(error);
    }
}

/// Stateless validator for MT103-style messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldValidator;

impl FieldValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate raw message text.
    pub fn validate(&self, raw: &str) -> ValidationResult {
        self.validate_message(&WireMessage::parse(raw))
    }

    /// Validate an already-parsed message.
    pub fn validate_message(&self, message: &WireMessage) -> ValidationResult {
        let mut result = ValidationResult::default();
        check_mandatory_fields(message, &mut result);
        check_bic_fields(message, &mut result);
        check_value_date(message, &mut result);
        check_amount(message, &mut result);
        result
    }

    /// Validate the message plus the BICs carried on the transaction record.
    pub fn validate_with_transaction(
        &self,
        raw: &str,
        transaction: &Transaction,
    ) -> ValidationResult {
        let mut result = self.validate(raw);
        check_transaction_bic("fromBankSwift", &transaction.from_bank_swift, &mut result);
        check_transaction_bic("toBankSwift", &transaction.to_bank_swift, &mut result);
        result
    }
}

fn check_mandatory_fields(message: &WireMessage, result: &mut ValidationResult) {
    for (tag, name) in MANDATORY_TAGS {
        if !message.has_field(tag) {
            result.push(format!("missing mandatory field :{tag}: ({name})"));
        }
    }
}

fn check_bic_fields(message: &WireMessage, result: &mut ValidationResult) {
    for tag in BIC_TAGS {
        if let Some(value) = message.field(tag) {
            let bic = value.trim();
            if !is_valid_bic(bic) {
                result.push(format!("invalid BIC in field :{tag}: '{bic}'"));
            }
        }
    }
}

fn check_transaction_bic(field: &str, bic: &str, result: &mut ValidationResult) {
    if !is_valid_bic(bic) {
        result.push(format!("invalid BIC in {field}: '{bic}'"));
    }
}

fn check_value_date(message: &WireMessage, result: &mut ValidationResult) {
    // A missing 32A is already reported by the mandatory-field check.
    let Some(value) = message.field("32A") else {
        return;
    };
    let value = value.trim();
    match value.get(..6) {
        Some(date) if is_valid_value_date(date) => {}
        _ => result.push(format!("invalid value date in field :32A: '{value}'")),
    }
}

fn check_amount(message: &WireMessage, result: &mut ValidationResult) {
    let Some(value) = message.field("32A") else {
        return;
    };
    let value = value.trim();
    // The amount starts after the 6-digit date and 3-letter currency code.
    match value.get(9..) {
        Some(amount) if is_valid_amount(amount) => {}
        _ => result.push(format!("invalid amount in field :32A: '{value}'")),
    }
}

/// 8 or 11 alphanumeric characters with an upper-case country code at
/// positions 5-6 (1-indexed).
pub fn is_valid_bic(bic: &str) -> bool {
    if bic.len() != 8 && bic.len() != 11 {
        return false;
    }
    if !bic.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return false;
    }
    let bytes = bic.as_bytes();
    bytes[4].is_ascii_uppercase() && bytes[5].is_ascii_uppercase()
}

/// `YYMMDD` with MM in 01-12 and DD in 01-31. Day-of-month is not checked
/// against the month; 250231 passes.
pub fn is_valid_value_date(date: &str) -> bool {
    if date.len() != 6 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let month: u32 = date[2..4].parse().unwrap_or(0);
    let day: u32 = date[4..6].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

/// Non-negative number with `,` or `.` both accepted as the decimal
/// separator; at most one separator, digits on both sides of it.
pub fn is_valid_amount(amount: &str) -> bool {
    if amount.is_empty() {
        return false;
    }
    if amount.matches([',', '.']).count() > 1 {
        return false;
    }
    match amount.find([',', '.']) {
        Some(pos) => {
            let (integral, fractional) = (&amount[..pos], &amount[pos + 1..]);
            !integral.is_empty()
                && !fractional.is_empty()
                && integral.bytes().all(|b| b.is_ascii_digit())
                && fractional.bytes().all(|b| b.is_ascii_digit())
        }
        None => amount.bytes().all(|b| b.is_ascii_digit()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn message(fields: &str) -> String {
        format!("{{1:F01COBADEFFAXXX0000000000}}{{2:I103DEUTDEFFXXXXN}}{{4:\n{fields}\n-}}{{5:}}")
    }

    const VALID_FIELDS: &str = ":20:TXN12345\n:23B:CRED\n:32A:250622EUR38329,19";

    #[test]
    fn test_well_formed_message_passes() {
        let result = FieldValidator::new().validate(&message(VALID_FIELDS));
        assert!(result.is_valid(), "unexpected errors: {:?}", result.errors());
    }

    #[test]
    fn test_each_missing_mandatory_tag_is_named() {
        let validator = FieldValidator::new();
        let cases = [
            (":23B:CRED\n:32A:250622EUR38329,19", "20"),
            (":20:TXN12345\n:32A:250622EUR38329,19", "23B"),
            (":20:TXN12345\n:23B:CRED", "32A"),
        ];
        for (fields, tag) in cases {
            let result = validator.validate(&message(fields));
            assert_eq!(result.errors().len(), 1, "fields: {}", fields);
            assert!(
                result.errors()[0].contains(&format!(":{tag}:")),
                "error should name tag {}: {:?}",
                tag,
                result.errors()
            );
        }
    }

    #[test]
    fn test_empty_mandatory_value_counts_as_missing() {
        let result =
            FieldValidator::new().validate(&message(":20:\n:23B:CRED\n:32A:250622EUR38329,19"));
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains(":20:"));
    }

    #[test]
    fn test_structural_garbage_degrades_to_missing_fields() {
        let result = FieldValidator::new().validate("complete nonsense, no blocks at all");
        let errors = result.errors();
        assert_eq!(errors.len(), 3);
        for (tag, _) in MANDATORY_TAGS {
            assert!(
                errors.iter().any(|e| e.contains(&format!(":{tag}:"))),
                "missing error for tag {}",
                tag
            );
        }
    }

    #[test]
    fn test_bic_format() {
        assert!(is_valid_bic("COBADEFF"));
        assert!(is_valid_bic("COBADEFFXXX"));
        assert!(!is_valid_bic("INVALID"));
        assert!(!is_valid_bic("1234567A"));
        assert!(!is_valid_bic("COBADEFFXX"));
        assert!(!is_valid_bic("COBA!EFF"));
    }

    #[test]
    fn test_bic_bearing_fields_are_checked() {
        let validator = FieldValidator::new();
        let fields = format!("{VALID_FIELDS}\n:52A:COBADEFF\n:57A:INVALID");
        let result = validator.validate(&message(&fields));
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains(":57A:"));
        assert!(result.errors()[0].contains("INVALID"));
    }

    #[test]
    fn test_value_date() {
        assert!(is_valid_value_date("250622"));
        assert!(is_valid_value_date("250231")); // lenient on day-per-month
        assert!(!is_valid_value_date("25062X"));
        assert!(!is_valid_value_date("251332")); // month 13
        assert!(!is_valid_value_date("250600")); // day 0
        assert!(!is_valid_value_date("2506"));
    }

    #[test]
    fn test_amount_format() {
        assert!(is_valid_amount("38329,19"));
        assert!(is_valid_amount("38329.19"));
        assert!(is_valid_amount("15000"));
        assert!(!is_valid_amount("ABCD,19"));
        assert!(!is_valid_amount("38329,19,00"));
        assert!(!is_valid_amount("38329,"));
        assert!(!is_valid_amount(",19"));
        assert!(!is_valid_amount("-500"));
        assert!(!is_valid_amount(""));
    }

    #[test]
    fn test_bad_date_and_amount_reported_from_32a() {
        let validator = FieldValidator::new();

        let result = validator.validate(&message(":20:T\n:23B:CRED\n:32A:25133XEUR100"));
        assert!(result.errors().iter().any(|e| e.contains("value date")));

        let result = validator.validate(&message(":20:T\n:23B:CRED\n:32A:250622EUR38329,19,00"));
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("amount"));
    }

    #[test]
    fn test_checks_accumulate_without_short_circuit() {
        // Missing 20, bad 52A BIC, bad amount: three independent errors.
        let fields = ":23B:CRED\n:32A:250622EURXX,1\n:52A:NOPE";
        let result = FieldValidator::new().validate(&message(fields));
        let errors = result.errors();
        assert_eq!(errors.len(), 3, "errors: {:?}", errors);
        assert!(errors[0].contains(":20:"));
        assert!(errors[1].contains(":52A:"));
        assert!(errors[2].contains("amount"));
    }

    #[test]
    fn test_transaction_bics_are_validated() {
        let mut tx = crate::types::transaction::Transaction::new(
            "tx_001",
            "ACC1",
            "ACC2",
            dec!(100),
            "EUR",
        );
        tx.from_bank_swift = "COBADEFF".to_string();
        tx.to_bank_swift = "SHORT".to_string();

        let result =
            FieldValidator::new().validate_with_transaction(&message(VALID_FIELDS), &tx);
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("toBankSwift"));
        assert!(result.errors()[0].contains("SHORT"));
    }
}
