use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarRoomError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Feed session rejected: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Ingest cycle already running for scope '{0}'")]
    CycleConflict(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
