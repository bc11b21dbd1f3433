use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventKitError {
    #[error("Derivation error: {0}")]
    Derivation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
