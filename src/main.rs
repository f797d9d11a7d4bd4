//! Wire-Transfer Screening Pipeline - Main Entry Point
//!
//! Consumes transactions with their raw MT103 text from NATS, validates
//! the message syntax, scores the survivors against the fraud rule set,
//! and routes rejections and alerts to their subjects. Transactions are
//! processed in parallel behind a worker semaphore.

use anyhow::Result;
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use wire_screening_pipeline::{
    config::AppConfig,
    consumer::{TransactionConsumer, WirePayload},
    detectors::engine::ScoringEngine,
    message::WireMessage,
    metrics::{MetricsReporter, PipelineMetrics},
    producer::AlertProducer,
    types::alert::RejectedTransaction,
    validator::FieldValidator,
    SharedDetectorConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        format!("wire_screening_pipeline={}", config.logging.level).parse()?,
    );
    if config.logging.format == "pretty" {
        tracing_subscriber::fmt().with_env_filter(filter).pretty().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting wire-transfer screening pipeline");
    info!(
        decision_threshold = config.detection.decision_threshold,
        workers = config.pipeline.workers,
        "Configuration loaded"
    );

    let metrics = Arc::new(PipelineMetrics::new());
    let validator = FieldValidator::new();
    let detector_config = Arc::new(SharedDetectorConfig::new(config.detection.clone()));
    let engine = Arc::new(ScoringEngine::new(detector_config));

    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = TransactionConsumer::new(
        client.clone(),
        &config.nats.transaction_subject,
        &config.nats.queue_group,
    );
    let producer = Arc::new(AlertProducer::new(
        client.clone(),
        &config.nats.alert_subject,
        &config.nats.rejected_subject,
    ));

    let semaphore = Arc::new(Semaphore::new(config.pipeline.workers));

    // Periodic metrics summary.
    let reporter_metrics = metrics.clone();
    tokio::spawn(async move {
        MetricsReporter::new(reporter_metrics, 30).start().await;
    });

    let mut subscription = consumer.subscribe().await?;
    info!(
        subject = %config.nats.transaction_subject,
        alert_subject = %config.nats.alert_subject,
        "Processing loop started"
    );

    while let Some(queue_message) = subscription.next().await {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };

        let engine = engine.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let started = Instant::now();

            let payload = match WirePayload::decode(&queue_message.payload) {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(error = %error, "Dropping undecodable message");
                    drop(permit);
                    return;
                }
            };

            let transaction = payload.transaction;
            let tx_id = transaction.transaction_id.clone();

            // Syntax gate first: invalid messages never reach scoring.
            let validation = validator.validate_with_transaction(&payload.raw_message, &transaction);
            if !validation.is_valid() {
                metrics.record_validation_failure();
                let rejection = RejectedTransaction {
                    transaction_id: tx_id.clone(),
                    errors: validation.into_errors(),
                    rejected_at: Utc::now(),
                };
                match producer.publish_rejection(&rejection).await {
                    Ok(()) => info!(
                        transaction_id = %tx_id,
                        errors = rejection.errors.len(),
                        "Transaction rejected by validation"
                    ),
                    Err(error) => error!(
                        transaction_id = %tx_id,
                        error = %error,
                        "Failed to publish rejection"
                    ),
                }
                drop(permit);
                return;
            }

            let message = WireMessage::parse(&payload.raw_message);
            let result = engine.evaluate(&transaction, &message);

            metrics.record_transaction(started.elapsed(), result.risk_score);
            for alert in &result.alerts {
                metrics.record_trigger(alert.rule.as_str());
            }

            if result.alerts.is_empty() {
                debug!(transaction_id = %tx_id, "Transaction clear");
            } else {
                metrics.record_alert(result.risk_level.as_str());
                match producer.publish_result(&result).await {
                    Ok(()) => info!(
                        transaction_id = %tx_id,
                        risk_score = result.risk_score,
                        risk_level = ?result.risk_level,
                        is_fraudulent = result.is_fraudulent,
                        processing_time_us = started.elapsed().as_micros(),
                        "Fraud alerts published"
                    ),
                    Err(error) => error!(
                        transaction_id = %tx_id,
                        error = %error,
                        "Failed to publish fraud alerts"
                    ),
                }
            }

            drop(permit);
        });
    }

    info!("Pipeline shutting down");
    metrics.print_summary();

    Ok(())
}
