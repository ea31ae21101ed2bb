/// Bulk export and import of the command registry
///
/// The document is `{"commands": [{"description", "command"}, ...]}` in
/// insertion order. It carries no vectors: import re-embeds every
/// description, so a file survives a change of embedding model.

use crate::core::Recorder;
use crate::db::{AddRequest, Database, TransferEntry};
use crate::embeddings::EmbeddingProvider;
use crate::error::{FastCmdError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

/// Top-level shape of an export file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferDocument {
    pub commands: Vec<TransferEntry>,
}

/// How an import went
#[derive(Debug, Default)]
pub struct ImportSummary {
    /// Entries committed to the store
    pub imported: usize,
    /// One line per element that was skipped, with the reason
    pub skipped: Vec<String>,
    /// Set when an embedding or storage failure stopped the import early.
    /// Everything counted in `imported` stays committed.
    pub interrupted: Option<FastCmdError>,
}

pub struct BulkTransfer {
    db: Arc<Database>,
    recorder: Recorder,
}

impl BulkTransfer {
    pub fn new(db: Arc<Database>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        let recorder = Recorder::new(Arc::clone(&db), embedder);
        Self { db, recorder }
    }

    /// Write every stored entry to `destination`
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of entries written
    /// * `Err(FastCmdError::EmptyRegistry)` - Nothing stored; no file is created
    pub async fn export(&self, destination: &Path) -> Result<usize> {
        let document = TransferDocument {
            commands: self
                .db
                .all_entries()
                .await?
                .into_iter()
                .map(TransferEntry::from)
                .collect(),
        };

        if document.commands.is_empty() {
            return Err(FastCmdError::EmptyRegistry);
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&document)?;
        tokio::fs::write(destination, json).await?;

        log::info!(
            "exported {} command(s) to {}",
            document.commands.len(),
            destination.display()
        );

        Ok(document.commands.len())
    }

    /// Read a document and add each valid element, one at a time, in order
    ///
    /// Elements missing a non-empty `description` or `command` are skipped
    /// with a warning. Each added entry gets a fresh id and a fresh vector.
    ///
    /// # Returns
    /// * `Ok(ImportSummary)` - Counts, skip reasons, and any failure that stopped it
    /// * `Err(FastCmdError::FileNotFound)` - `source` doesn't exist
    /// * `Err(FastCmdError::MalformedDocument)` - Not JSON, or no `commands` array
    pub async fn import(&self, source: &Path) -> Result<ImportSummary> {
        if !source.exists() {
            return Err(FastCmdError::FileNotFound(source.display().to_string()));
        }

        let raw = tokio::fs::read_to_string(source).await?;
        let elements = parse_document(&raw)?;

        let mut summary = ImportSummary::default();
        for (index, element) in elements.into_iter().enumerate() {
            let request = match element_to_request(&element) {
                Ok(request) => request,
                Err(reason) => {
                    log::warn!("skipping import element {}: {}", index, reason);
                    summary.skipped.push(format!("element {}: {}", index, reason));
                    continue;
                }
            };

            match self.recorder.record(&request).await {
                Ok(_) => summary.imported += 1,
                Err(FastCmdError::InvalidInput(reason)) => {
                    log::warn!("skipping import element {}: {}", index, reason);
                    summary.skipped.push(format!("element {}: {}", index, reason));
                }
                Err(e) => {
                    log::warn!("import stopped at element {}: {}", index, e);
                    summary.interrupted = Some(e);
                    break;
                }
            }
        }

        log::info!(
            "imported {} command(s), skipped {}",
            summary.imported,
            summary.skipped.len()
        );

        Ok(summary)
    }
}

fn parse_document(raw: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| FastCmdError::MalformedDocument(format!("not valid JSON: {}", e)))?;

    match value {
        Value::Object(mut map) => match map.remove("commands") {
            Some(Value::Array(elements)) => Ok(elements),
            Some(_) => Err(FastCmdError::MalformedDocument(
                "'commands' must be a list".to_string(),
            )),
            None => Err(FastCmdError::MalformedDocument(
                "missing 'commands' list".to_string(),
            )),
        },
        _ => Err(FastCmdError::MalformedDocument(
            "top level must be an object".to_string(),
        )),
    }
}

fn element_to_request(element: &Value) -> std::result::Result<AddRequest, String> {
    let field = |name: &str| -> std::result::Result<String, String> {
        match element.get(name) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
            Some(Value::String(_)) => Err(format!("empty '{}'", name)),
            Some(_) => Err(format!("'{}' is not a string", name)),
            None => Err(format!("missing '{}'", name)),
        }
    };

    if !element.is_object() {
        return Err("not an object".to_string());
    }

    Ok(AddRequest::new(field("description")?, field("command")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEmbeddings, TEST_DIMENSION};
    use serde_json::json;
    use tempfile::TempDir;

    async fn setup(embedder: FakeEmbeddings) -> (BulkTransfer, Arc<Database>) {
        let db = Arc::new(Database::new_test(TEST_DIMENSION).await.unwrap());
        (BulkTransfer::new(Arc::clone(&db), Arc::new(embedder)), db)
    }

    fn write_json(dir: &TempDir, name: &str, value: &Value) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_export_writes_document() {
        let (transfer, _db) = setup(FakeEmbeddings::new()).await;
        transfer
            .recorder
            .record(&AddRequest::new("List files", "ls -l"))
            .await
            .unwrap();
        transfer
            .recorder
            .record(&AddRequest::new("Show disk usage", "df -h"))
            .await
            .unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exported.json");
        let count = transfer.export(&path).await.unwrap();
        assert_eq!(count, 2);

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            written,
            json!({
                "commands": [
                    { "description": "List files", "command": "ls -l" },
                    { "description": "Show disk usage", "command": "df -h" }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_export_empty_registry() {
        let (transfer, _db) = setup(FakeEmbeddings::new()).await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exported.json");
        let result = transfer.export(&path).await;

        assert!(matches!(result, Err(FastCmdError::EmptyRegistry)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_export_then_import_roundtrip() {
        let pairs = [
            ("List files in color format", "ls --color=auto"),
            ("Show git log graph", "git log --oneline --graph"),
            ("Count lines of rust", "find . -name '*.rs' | xargs wc -l"),
        ];

        let (source, _) = setup(FakeEmbeddings::new()).await;
        for (d, c) in pairs {
            source.recorder.record(&AddRequest::new(d, c)).await.unwrap();
        }
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("backup.json");
        source.export(&path).await.unwrap();

        let (target, target_db) = setup(FakeEmbeddings::new()).await;
        let summary = target.import(&path).await.unwrap();
        assert_eq!(summary.imported, 3);
        assert!(summary.skipped.is_empty());
        assert!(summary.interrupted.is_none());

        let restored: Vec<(String, String)> = target_db
            .all_entries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.description, e.command))
            .collect();
        let expected: Vec<(String, String)> = pairs
            .iter()
            .map(|(d, c)| (d.to_string(), c.to_string()))
            .collect();
        assert_eq!(restored, expected);
        assert!(target_db.stats().await.unwrap().is_consistent());
    }

    #[tokio::test]
    async fn test_import_skips_malformed_element() {
        let (transfer, db) = setup(FakeEmbeddings::new()).await;
        let dir = TempDir::new().unwrap();
        let path = write_json(
            &dir,
            "import.json",
            &json!({
                "commands": [
                    { "description": "Echo hello", "command": "echo hello" },
                    { "description": "No command here" }
                ]
            }),
        );

        let summary = transfer.import(&path).await.unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped.len(), 1);
        assert!(summary.skipped[0].contains("missing 'command'"));
        assert_eq!(db.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_skips_wrong_types() {
        let (transfer, db) = setup(FakeEmbeddings::new()).await;
        let dir = TempDir::new().unwrap();
        let path = write_json(
            &dir,
            "import.json",
            &json!({
                "commands": [
                    "echo hello",
                    { "description": 42, "command": "true" },
                    { "description": "", "command": "true" },
                    { "description": "Print date", "command": "date" }
                ]
            }),
        );

        let summary = transfer.import(&path).await.unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.skipped.len(), 3);
        assert_eq!(db.all_entries().await.unwrap()[0].command, "date");
    }

    #[tokio::test]
    async fn test_import_file_not_found() {
        let (transfer, _db) = setup(FakeEmbeddings::new()).await;
        let dir = TempDir::new().unwrap();

        let result = transfer.import(&dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(FastCmdError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_import_malformed_document() {
        let (transfer, db) = setup(FakeEmbeddings::new()).await;
        let dir = TempDir::new().unwrap();

        for (name, body) in [
            ("list.json", json!([{ "description": "a", "command": "b" }])),
            ("nolist.json", json!({ "entries": [] })),
            ("notarray.json", json!({ "commands": "ls" })),
        ] {
            let path = write_json(&dir, name, &body);
            let result = transfer.import(&path).await;
            assert!(
                matches!(result, Err(FastCmdError::MalformedDocument(_))),
                "{} should be malformed",
                name
            );
        }

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{ not json").unwrap();
        assert!(matches!(
            transfer.import(&garbage).await,
            Err(FastCmdError::MalformedDocument(_))
        ));

        assert_eq!(db.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_import_interrupted_keeps_earlier_entries() {
        let (transfer, db) = setup(FakeEmbeddings::new().failing_after(2)).await;
        let dir = TempDir::new().unwrap();
        let path = write_json(
            &dir,
            "import.json",
            &json!({
                "commands": [
                    { "description": "one", "command": "echo 1" },
                    { "description": "two", "command": "echo 2" },
                    { "description": "three", "command": "echo 3" },
                    { "description": "four", "command": "echo 4" }
                ]
            }),
        );

        let summary = transfer.import(&path).await.unwrap();
        assert_eq!(summary.imported, 2);
        assert!(matches!(
            summary.interrupted,
            Some(FastCmdError::EmbeddingUnavailable(_))
        ));
        assert_eq!(db.count().await.unwrap(), 2);
    }
}
