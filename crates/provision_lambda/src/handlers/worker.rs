use chrono::{DateTime, Utc};
use provision_core::contract::ProvisionRequest;
use provision_core::render::{
    branch_name, commit_message, pull_request_title, render_instance_config, terraform_file_path,
    InstanceParameters, PULL_REQUEST_BODY,
};
use provision_core::sizing::{resolve_engine_version, resolve_instance_class};
use serde_json::{json, Value};

use crate::adapters::source_control::{PullRequestRef, SourceControlGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    pub repository: String,
    pub base_branch: String,
}

/// Result of one queued message. Failures never abort the batch; they are
/// logged and carried here so the caller can decide what the invocation as
/// a whole reports.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    PullRequestOpened {
        database_name: String,
        branch: String,
        pull_request: PullRequestRef,
    },
    Failed {
        reason: String,
    },
}

/// Process one SQS batch as an explicit fold over its records.
///
/// Only a structurally unusable event (no `Records` array) fails the
/// invocation; every per-message error — bad envelope, unsupported engine,
/// GitHub call failure — is caught, logged with the offending record, and
/// processing continues with the next message. No step is retried and no
/// partial branch/file state is cleaned up on failure.
pub fn handle_queue_event(
    event: &Value,
    config: &WorkerConfig,
    gateway: &dyn SourceControlGateway,
    now: DateTime<Utc>,
) -> Result<Vec<MessageOutcome>, String> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| "SQS event must include a Records array".to_string())?;

    log_worker_info(
        "batch_received",
        json!({
            "records": records.len(),
            "repository": config.repository,
        }),
    );

    let mut outcomes = Vec::with_capacity(records.len());
    for record in records {
        let outcome = match provision_from_record(record, config, gateway, now) {
            Ok(outcome) => outcome,
            Err(reason) => {
                log_worker_error(
                    "message_failed",
                    json!({
                        "record": record,
                        "error": reason,
                    }),
                );
                MessageOutcome::Failed { reason }
            }
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

fn provision_from_record(
    record: &Value,
    config: &WorkerConfig,
    gateway: &dyn SourceControlGateway,
    now: DateTime<Utc>,
) -> Result<MessageOutcome, String> {
    let body = record
        .get("body")
        .and_then(Value::as_str)
        .ok_or_else(|| "SQS record body must be a string".to_string())?;
    let request = unwrap_published_request(body)?;

    let engine = request.database_engine.trim().to_lowercase();
    let engine_version = resolve_engine_version(&request.database_engine)
        .map_err(|error| error.to_string())?;
    let instance_class = resolve_instance_class(&request.environment);

    let branch = branch_name(&request.database_name, now);
    let base_sha = gateway.branch_head_sha(&config.base_branch)?;
    gateway.create_branch(&branch, &base_sha)?;

    let parameters = InstanceParameters {
        database_name: request.database_name.clone(),
        engine,
        engine_version: engine_version.to_string(),
        instance_class: instance_class.to_string(),
        environment: request.environment.trim().to_string(),
    };
    let rendered = render_instance_config(&parameters);
    gateway.commit_file(
        &branch,
        &terraform_file_path(&request.database_name),
        &rendered,
        &commit_message(&request.database_name),
    )?;

    let pull_request = gateway.open_pull_request(
        &branch,
        &config.base_branch,
        &pull_request_title(&request.database_name),
        PULL_REQUEST_BODY,
    )?;

    log_worker_info(
        "pull_request_opened",
        json!({
            "database_name": request.database_name,
            "branch": branch,
            "pull_request_number": pull_request.number,
            "pull_request_url": pull_request.url,
        }),
    );

    Ok(MessageOutcome::PullRequestOpened {
        database_name: request.database_name,
        branch,
        pull_request,
    })
}

/// Double unwrap: the SQS record body is an SNS delivery envelope whose
/// `Message` field is the JSON-encoded published request.
fn unwrap_published_request(body: &str) -> Result<ProvisionRequest, String> {
    let envelope: Value =
        serde_json::from_str(body).map_err(|error| format!("invalid SNS envelope: {error}"))?;
    let message = envelope
        .get("Message")
        .and_then(Value::as_str)
        .ok_or_else(|| "SNS envelope must include a Message string".to_string())?;
    serde_json::from_str(message)
        .map_err(|error| format!("invalid provision request payload: {error}"))
}

fn log_worker_info(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "provisioning_worker",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_worker_error(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "provisioning_worker",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
