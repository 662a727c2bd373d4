use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with pretty formatting for development
/// and JSON formatting for production.
///
/// Uses RUST_LOG environment variable for filtering (defaults to "info" if not set).
/// Output goes to stderr; stdout is left to the caller.
pub fn setup_logging(environment: Environment) {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    match environment {
        Environment::Production => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        Environment::Development => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_ansi(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

/// Creates an info-level span and enters it.
#[macro_export]
macro_rules! span {
    ($name:literal) => {
        tracing::info_span!($name).entered()
    };
}

/// Creates a debug-level span and enters it.
#[macro_export]
macro_rules! span_debug {
    ($name:literal) => {
        tracing::debug_span!($name).entered()
    };
}
