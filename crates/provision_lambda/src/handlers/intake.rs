use provision_core::contract::validate_intake_payload;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::publish::RequestPublisher;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

/// Validate one inbound provisioning request and forward it to the topic.
///
/// Every path returns a structured response: malformed or incomplete input
/// is a 400 with no publish attempt, publish failures are a 500, and a
/// well-formed request performs exactly one publish. Topic configuration is
/// validated at cold start by the binary, never here.
pub fn handle_intake_event(event: Value, publisher: &dyn RequestPublisher) -> ApiGatewayResponse {
    log_intake_info("request_received", json!({ "event": event }));

    let payload = match normalize_apigw_event(&event) {
        Ok(value) => value,
        Err(message) => {
            log_intake_info("request_rejected", json!({ "reason": message }));
            return missing_parameters_response();
        }
    };

    let message = match validate_intake_payload(&payload) {
        Ok(value) => value,
        Err(error) => {
            log_intake_info("request_rejected", json!({ "reason": error.message() }));
            return missing_parameters_response();
        }
    };

    let message_body = match serde_json::to_string(&message) {
        Ok(value) => value,
        Err(error) => return error_response(500, json!({ "error": error.to_string() })),
    };

    match publisher.publish(&message_body) {
        Ok(message_id) => {
            log_intake_info(
                "request_published",
                json!({
                    "database_name": message.database_name,
                    "sns_message_id": message_id,
                }),
            );
            success_response(
                200,
                json!({
                    "message": "Request accepted",
                    "sns_message_id": message_id,
                }),
            )
        }
        Err(error) => {
            log_intake_error("publish_failed", json!({ "error": error }));
            error_response(500, json!({ "error": error }))
        }
    }
}

fn normalize_apigw_event(event: &Value) -> Result<Value, String> {
    let Some(object) = event.as_object() else {
        return Err("Request payload must be a JSON object".to_string());
    };

    match object.get("body") {
        None | Some(Value::Null) => Err("Request body is required".to_string()),
        Some(Value::Object(_)) => Ok(object["body"].clone()),
        Some(Value::String(text)) => {
            serde_json::from_str(text).map_err(|error| format!("Malformed JSON body: {error}"))
        }
        Some(_) => Err("Request body must be a JSON object".to_string()),
    }
}

fn missing_parameters_response() -> ApiGatewayResponse {
    error_response(400, json!({ "error": "Missing required parameters" }))
}

fn success_response(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: serde_json::to_string(&payload).expect("response payload should serialize"),
    }
}

fn error_response(status_code: u16, payload: Value) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body: payload.to_string(),
    }
}

fn log_intake_info(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "request_intake",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_intake_error(event: &str, details: Value) {
    eprintln!(
        "{}",
        json!({
            "component": "request_intake",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
