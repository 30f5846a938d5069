use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("CONFIG_CORRUPT: {0}")]
    ConfigCorrupt(String),
    #[error("PERSISTENCE_FAILURE: {0}")]
    Persistence(String),
    #[error("DIRECTORY_UNAVAILABLE: {0}")]
    DirectoryUnavailable(String),
    #[error("DIRECTORY_CREATE_FAILURE: {0}")]
    DirectoryCreate(String),
    #[error("NO_WORKSPACE: {0}")]
    NoWorkspace(String),
    #[error("INVALID_NOTE_NAME: {0}")]
    InvalidNoteName(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Persistence(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
