//! Pure domain logic for the RDS provisioning pipeline.
//!
//! This crate owns the request contract, the environment/engine lookup
//! tables, and the Terraform rendering. Nothing here performs I/O; the
//! Lambda runtime crate wires these primitives to SNS, SQS, Secrets
//! Manager, and GitHub.

pub mod contract;
pub mod render;
pub mod sizing;
