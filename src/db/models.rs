/// Data models for the command store
///
/// Row types map to database tables and use sqlx for type-safe queries.
/// Request types carry exactly what one operation needs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored (description, command) pair, without its vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CommandEntry {
    pub id: i64,
    pub command: String,
    pub description: String,
}

/// Entry as it travels in an export document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEntry {
    pub description: String,
    pub command: String,
}

impl From<CommandEntry> for TransferEntry {
    fn from(entry: CommandEntry) -> Self {
        Self {
            description: entry.description,
            command: entry.command,
        }
    }
}

/// A retrieval hit: stored text plus its distance to the query vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: i64,
    pub description: String,
    pub command: String,
    pub distance: f64,
}

impl MatchResult {
    /// Display confidence, see `Scorer::confidence_percent`
    pub fn confidence_percent(&self) -> i64 {
        crate::core::Scorer::confidence_percent(self.distance)
    }
}

/// Input for the add operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRequest {
    pub description: String,
    pub command: String,
}

impl AddRequest {
    pub fn new(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: command.into(),
        }
    }
}

/// Input for the search operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query_text: String,
}

impl SearchRequest {
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: query_text.into(),
        }
    }
}

/// Input for export. `None` means the default location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRequest {
    pub destination: Option<std::path::PathBuf>,
}

/// Input for import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub source: std::path::PathBuf,
}
