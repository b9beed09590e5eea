pub mod intake;
pub mod worker;
