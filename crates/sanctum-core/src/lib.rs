pub mod app_config;
pub mod config;
pub mod contacts;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use contacts::{
    is_blank, CanonicalField, ContactId, ContactRecord, ContactStatus, ContactType,
};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown contact field: {0}")]
    UnknownField(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
