//! Deterministic naming and Terraform rendering for a provisioning change.

use chrono::{DateTime, Utc};

use crate::contract::{ALLOCATED_STORAGE_GB, BRANCH_PREFIX, MASTER_PASSWORD_REFERENCE, MASTER_USERNAME};

pub const PULL_REQUEST_BODY: &str = "This pull request was opened automatically by the database \
provisioning pipeline. It adds a Terraform definition for the requested RDS instance; review the \
sizing and engine parameters before merging.";

/// Resolved parameters embedded into the rendered Terraform resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceParameters {
    pub database_name: String,
    pub engine: String,
    pub engine_version: String,
    pub instance_class: String,
    pub environment: String,
}

/// Branch names carry a 14-digit UTC second stamp so repeated requests for
/// the same database sort lexically and do not collide.
pub fn branch_name(database_name: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "{BRANCH_PREFIX}{database_name}-instance-{}",
        timestamp.format("%Y%m%d%H%M%S")
    )
}

pub fn terraform_file_path(database_name: &str) -> String {
    format!("terraform/{database_name}-main.tf")
}

pub fn commit_message(database_name: &str) -> String {
    format!("Add RDS instance definition for {database_name}")
}

pub fn pull_request_title(database_name: &str) -> String {
    format!("Provision RDS for {database_name}")
}

/// Render the `aws_db_instance` resource. The password attribute is a
/// reference into Secrets Manager, never a literal value.
pub fn render_instance_config(params: &InstanceParameters) -> String {
    format!(
        r#"resource "aws_db_instance" "{name}" {{
  identifier          = "{name}"
  allocated_storage   = {storage}
  engine              = "{engine}"
  engine_version      = "{engine_version}"
  instance_class      = "{instance_class}"
  db_name             = "{name}"
  username            = "{username}"
  password            = {password}
  skip_final_snapshot = true
  publicly_accessible = true

  tags = {{
    Name        = "{name}"
    Environment = "{environment}"
  }}
}}
"#,
        name = params.database_name,
        storage = ALLOCATED_STORAGE_GB,
        engine = params.engine,
        engine_version = params.engine_version,
        instance_class = params.instance_class,
        username = MASTER_USERNAME,
        password = MASTER_PASSWORD_REFERENCE,
        environment = params.environment,
    )
}
