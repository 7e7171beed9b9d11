//! Error types for test-data management

use thiserror::Error;

use practice_api::ApiError;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Fixture '{key}' not found in {fixture}")]
    FixtureNotFound { fixture: String, key: String },

    #[error("Fixture {0} is not a JSON object")]
    FixtureShape(String),

    #[error("Note creation failed with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    NoteCreationFailed {
        status: u16,
        message: Option<String>,
    },

    #[error("No notes were created successfully ({requested} requested)")]
    BatchCreationFailed { requested: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
