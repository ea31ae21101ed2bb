/// Error types for fastcmd
///
/// Every failure the command store, the embedding provider, the execution
/// gate or bulk transfer can report. Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Main error type for fastcmd operations
#[derive(Error, Debug)]
pub enum FastCmdError {
    /// Empty description, query or command
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Embedding provider unreachable, unauthorized or answering garbage
    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Vector shape inconsistency
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Durable store could not be opened
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Export requested with nothing stored
    #[error("No commands stored")]
    EmptyRegistry,

    /// Import source missing
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Import document has the wrong top-level shape
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Shell command ran but exited non-zero
    #[error("Command exited with code {exit_code}: {stderr}")]
    ExecutionFailed { exit_code: i32, stderr: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for fastcmd operations
pub type Result<T> = std::result::Result<T, FastCmdError>;

/// Convert FastCmdError to a user-friendly error message
impl FastCmdError {
    pub fn user_message(&self) -> String {
        match self {
            FastCmdError::InvalidInput(reason) => format!("Invalid input: {}", reason),
            FastCmdError::EmbeddingUnavailable(msg) => {
                format!("Could not compute embedding. Check your API key and network. Details: {}", msg)
            }
            FastCmdError::DimensionMismatch { expected, actual } => format!(
                "Stored vectors do not match the embedding model ({} vs {} dimensions)",
                expected, actual
            ),
            FastCmdError::StorageUnavailable(msg) => {
                format!("Command store unavailable. Check permissions. Details: {}", msg)
            }
            FastCmdError::Database(e) => {
                format!("Database error occurred. Please try again. Details: {}", e)
            }
            FastCmdError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            FastCmdError::Serialization(e) => format!("Data format error: {}", e),
            FastCmdError::EmptyRegistry => "No commands found to export.".to_string(),
            FastCmdError::FileNotFound(path) => format!("File not found: {}", path),
            FastCmdError::MalformedDocument(reason) => {
                format!("Invalid import file format: {}", reason)
            }
            FastCmdError::ExecutionFailed { exit_code, stderr } if stderr.trim().is_empty() => {
                format!("Command failed with error: exited with code {}", exit_code)
            }
            FastCmdError::ExecutionFailed { stderr, .. } => {
                format!("Command failed with error: {}", stderr.trim_end())
            }
            FastCmdError::Config(msg) => format!("Configuration issue: {}", msg),
            FastCmdError::Generic(msg) => msg.clone(),
        }
    }
}
