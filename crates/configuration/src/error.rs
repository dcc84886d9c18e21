use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from the environment: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}
