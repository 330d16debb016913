use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("no task found for {key}")]
    NotFound { key: String },
    #[error("task already running for {key}")]
    AlreadyRunning { key: String },
    #[error("task {key} failed: {message}")]
    Failed { key: String, message: String },
    #[error("task {key} was cancelled")]
    Cancelled { key: String },
}

pub type TaskResult<T> = Result<T, TaskError>;
