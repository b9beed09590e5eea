use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const BASE_BRANCH: &str = "main";
pub const BRANCH_PREFIX: &str = "create-";

pub const DEFAULT_DATABASE_NAME: &str = "exampledb";
pub const DEFAULT_DATABASE_ENGINE: &str = "mysql";
pub const DEFAULT_ENVIRONMENT: &str = "dev";

pub const ALLOCATED_STORAGE_GB: u32 = 20;
pub const MASTER_USERNAME: &str = "dbadmin";
/// Terraform reference expression for the instance password. The rendered
/// file must never embed a literal secret value.
pub const MASTER_PASSWORD_REFERENCE: &str =
    "data.aws_secretsmanager_secret_version.database_credentials.secret_string";

/// Provisioning intent as delivered to the worker. Fields absent from or
/// null in the queued payload fall back to the documented defaults; the
/// intake stage never relies on these and validates strictly instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProvisionRequest {
    #[serde(
        default = "default_database_name",
        deserialize_with = "database_name_or_default"
    )]
    pub database_name: String,
    #[serde(
        default = "default_database_engine",
        deserialize_with = "database_engine_or_default"
    )]
    pub database_engine: String,
    #[serde(
        default = "default_environment",
        deserialize_with = "environment_or_default"
    )]
    pub environment: String,
}

/// The exact message body published to the topic: the three request fields
/// and nothing else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishedMessage {
    pub database_name: String,
    pub database_engine: String,
    pub environment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

fn default_database_name() -> String {
    DEFAULT_DATABASE_NAME.to_string()
}

fn default_database_engine() -> String {
    DEFAULT_DATABASE_ENGINE.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn null_to_default<'de, D>(deserializer: D, fallback: &str) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(|| fallback.to_string()))
}

fn database_name_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    null_to_default(deserializer, DEFAULT_DATABASE_NAME)
}

fn database_engine_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    null_to_default(deserializer, DEFAULT_DATABASE_ENGINE)
}

fn environment_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    null_to_default(deserializer, DEFAULT_ENVIRONMENT)
}

/// Strict intake-side validation: all three fields must be present and
/// non-empty after trimming. No defaulting happens here; a request that
/// omits a field is a client error, not a degraded provision.
pub fn validate_intake_payload(payload: &Value) -> Result<PublishedMessage, ValidationError> {
    let Some(object) = payload.as_object() else {
        return Err(ValidationError::new("request body must be a JSON object"));
    };

    let database_name = required_field(object, "database_name")?;
    let database_engine = required_field(object, "database_engine")?;
    let environment = required_field(object, "environment")?;

    Ok(PublishedMessage {
        database_name,
        database_engine,
        environment,
    })
}

fn required_field(
    object: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<String, ValidationError> {
    let value = object
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if value.is_empty() {
        return Err(ValidationError::new(format!(
            "{name} is required and cannot be empty"
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_accepts_complete_payload() {
        let message = validate_intake_payload(&json!({
            "database_name": "orders",
            "database_engine": "postgres",
            "environment": "production"
        }))
        .expect("payload should validate");

        assert_eq!(
            message,
            PublishedMessage {
                database_name: "orders".to_string(),
                database_engine: "postgres".to_string(),
                environment: "production".to_string(),
            }
        );
    }

    #[test]
    fn validate_rejects_each_missing_field() {
        for field in ["database_name", "database_engine", "environment"] {
            let mut payload = json!({
                "database_name": "orders",
                "database_engine": "postgres",
                "environment": "production"
            });
            payload.as_object_mut().expect("object").remove(field);

            let error = validate_intake_payload(&payload).expect_err("missing field should fail");
            assert!(error.message().contains(field));
        }
    }

    #[test]
    fn validate_treats_whitespace_as_missing() {
        let error = validate_intake_payload(&json!({
            "database_name": "   ",
            "database_engine": "postgres",
            "environment": "production"
        }))
        .expect_err("blank name should fail");
        assert!(error.message().contains("database_name"));
    }

    #[test]
    fn validate_rejects_non_object_payload() {
        let error = validate_intake_payload(&json!("orders")).expect_err("string should fail");
        assert_eq!(error.message(), "request body must be a JSON object");
    }

    #[test]
    fn worker_parse_defaults_absent_fields_only() {
        let request: ProvisionRequest =
            serde_json::from_str("{}").expect("empty payload should parse with defaults");
        assert_eq!(request.database_name, "exampledb");
        assert_eq!(request.database_engine, "mysql");
        assert_eq!(request.environment, "dev");

        let request: ProvisionRequest =
            serde_json::from_str(r#"{"database_name":"orders"}"#).expect("partial should parse");
        assert_eq!(request.database_name, "orders");
        assert_eq!(request.database_engine, "mysql");
        assert_eq!(request.environment, "dev");
    }

    #[test]
    fn worker_parse_treats_null_fields_as_absent() {
        let request: ProvisionRequest = serde_json::from_str(
            r#"{"database_name":null,"database_engine":null,"environment":"prod"}"#,
        )
        .expect("null fields should parse with defaults");
        assert_eq!(request.database_name, "exampledb");
        assert_eq!(request.database_engine, "mysql");
        assert_eq!(request.environment, "prod");
    }

    #[test]
    fn published_message_serializes_exactly_three_fields() {
        let message = PublishedMessage {
            database_name: "orders".to_string(),
            database_engine: "postgres".to_string(),
            environment: "production".to_string(),
        };
        let value = serde_json::to_value(&message).expect("message should serialize");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 3);
        assert_eq!(object["database_name"], "orders");
    }
}
