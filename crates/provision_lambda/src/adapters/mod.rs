pub mod publish;
pub mod secrets;
pub mod source_control;
