use std::env;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn from_env() -> Self {
        Self::parse(&env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()))
    }

    /// Anything that is not `production`/`prod` (case-insensitive) is development.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}
