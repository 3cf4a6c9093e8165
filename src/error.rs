use std::fmt;

#[derive(Debug)]
pub enum GenError {
    ConfigError(String),
    RequestError(String),
    ResponseError(String),
    SerializationError(String),
    SubmissionError(String),
    TaskFailed(String),
    Timeout(String),
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            GenError::RequestError(msg) => write!(f, "Request error: {}", msg),
            GenError::ResponseError(msg) => write!(f, "Response error: {}", msg),
            GenError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            GenError::SubmissionError(msg) => write!(f, "Submission rejected: {}", msg),
            GenError::TaskFailed(msg) => write!(f, "Generation task failed: {}", msg),
            GenError::Timeout(msg) => write!(f, "Generation timed out: {}", msg),
        }
    }
}

impl std::error::Error for GenError {}

pub type Result<T> = std::result::Result<T, GenError>;
