//! Lookup tables mapping request fields to deployment parameters.

pub const SMALL_INSTANCE_CLASS: &str = "db.t3.micro";
pub const PRODUCTION_INSTANCE_CLASS: &str = "db.m5.large";

pub const MYSQL_ENGINE_VERSION: &str = "8.0";
pub const POSTGRES_ENGINE_VERSION: &str = "15.4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedEngineError {
    engine: String,
}

impl UnsupportedEngineError {
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
        }
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }
}

impl std::fmt::Display for UnsupportedEngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unsupported database engine '{}'", self.engine)
    }
}

impl std::error::Error for UnsupportedEngineError {}

/// Map an engine string to the version that gets provisioned. Matching is
/// case- and whitespace-insensitive; engines outside the known set abort
/// the message they arrived on. The error carries the input as received so
/// logs show what actually arrived, not the normalized form.
pub fn resolve_engine_version(engine: &str) -> Result<&'static str, UnsupportedEngineError> {
    match engine.trim().to_lowercase().as_str() {
        "mysql" => Ok(MYSQL_ENGINE_VERSION),
        "postgres" => Ok(POSTGRES_ENGINE_VERSION),
        _ => Err(UnsupportedEngineError::new(engine)),
    }
}

/// Map an environment string to an instance tier. Unknown environments get
/// the production tier rather than failing the message.
pub fn resolve_instance_class(environment: &str) -> &'static str {
    match environment.trim().to_lowercase().as_str() {
        "dev" | "development" => SMALL_INSTANCE_CLASS,
        "prod" | "production" => PRODUCTION_INSTANCE_CLASS,
        _ => PRODUCTION_INSTANCE_CLASS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_engine_versions() {
        assert_eq!(resolve_engine_version("mysql").expect("mysql"), "8.0");
        assert_eq!(resolve_engine_version("postgres").expect("postgres"), "15.4");
        assert_eq!(resolve_engine_version(" Postgres ").expect("trimmed"), "15.4");
    }

    #[test]
    fn rejects_unknown_engine() {
        let error = resolve_engine_version("oracle").expect_err("oracle is unsupported");
        assert_eq!(error.engine(), "oracle");
        assert_eq!(
            error.to_string(),
            "unsupported database engine 'oracle'"
        );
    }

    #[test]
    fn unknown_engine_error_reports_the_input_as_received() {
        let error = resolve_engine_version(" Oracle ").expect_err("oracle is unsupported");
        assert_eq!(error.engine(), " Oracle ");
        assert_eq!(error.to_string(), "unsupported database engine ' Oracle '");
    }

    #[test]
    fn resolves_instance_tiers() {
        assert_eq!(resolve_instance_class("dev"), "db.t3.micro");
        assert_eq!(resolve_instance_class("Development"), "db.t3.micro");
        assert_eq!(resolve_instance_class("prod"), "db.m5.large");
        assert_eq!(resolve_instance_class(" PRODUCTION "), "db.m5.large");
    }

    #[test]
    fn unknown_environment_falls_back_to_production_tier() {
        assert_eq!(resolve_instance_class("staging"), "db.m5.large");
        assert_eq!(resolve_instance_class(""), "db.m5.large");
    }
}
