//! AWS-oriented adapters and handlers for the provisioning pipeline.
//!
//! This crate owns runtime integration details (Lambda handlers, topic
//! publishing, secret retrieval, and the GitHub gateway) around the pure
//! logic in `provision_core`. Each Lambda function has its own binary under
//! `src/bin/` that wires real clients into the handler traits.

pub mod adapters;
pub mod handlers;
