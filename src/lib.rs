//! Wire-Transfer Screening Pipeline Library
//!
//! Validates MT103-style wire messages and scores transactions against a
//! weighted set of fraud rules, consuming transactions from NATS and
//! publishing alerts and rejections back out.

pub mod config;
pub mod consumer;
pub mod detectors;
pub mod message;
pub mod metrics;
pub mod producer;
pub mod types;
pub mod validator;

pub use config::{AppConfig, DetectorConfig, SharedDetectorConfig};
pub use consumer::{TransactionConsumer, WirePayload};
pub use detectors::engine::ScoringEngine;
pub use detectors::DetectorKind;
pub use message::WireMessage;
pub use metrics::{MetricsReporter, PipelineMetrics};
pub use producer::AlertProducer;
pub use types::alert::{FraudAlert, FraudDetectionResult, RiskLevel};
pub use types::transaction::Transaction;
pub use validator::{FieldValidator, ValidationResult};
