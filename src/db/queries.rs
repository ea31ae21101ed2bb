/// SQL query functions for the command store
///
/// Text rows live in `commands`, vectors in `vec_commands`, joined by id.

use crate::db::models::*;
use crate::db::vector::{cosine_distance, decode_embedding, encode_embedding};
use crate::db::Database;
use crate::error::{FastCmdError, Result};
use sqlx::Row;

impl Database {
    /// Store a new command entry
    ///
    /// Text row and vector row are written in one transaction: both land or
    /// neither does.
    ///
    /// # Arguments
    /// * `embedding` - Vector of the description, must match the store dimension
    /// * `command` - Literal command line
    /// * `description` - The text that was embedded
    ///
    /// # Returns
    /// * `Ok(i64)` - The new entry id
    /// * `Err(FastCmdError::DimensionMismatch)` - Nothing was written
    /// * `Err(FastCmdError::InvalidInput)` - NaN or infinite component, nothing was written
    pub async fn insert_entry(
        &self,
        embedding: &[f32],
        command: &str,
        description: &str,
    ) -> Result<i64> {
        ensure_finite(embedding)?;

        let mut tx = self.pool().begin().await?;

        let row = sqlx::query("INSERT INTO commands (command, description) VALUES (?, ?) RETURNING id")
            .bind(command)
            .bind(description)
            .fetch_one(&mut *tx)
            .await?;
        let id: i64 = row.get(0);

        if embedding.len() != self.dimension() {
            tx.rollback().await?;
            return Err(FastCmdError::DimensionMismatch {
                expected: self.dimension(),
                actual: embedding.len(),
            });
        }

        sqlx::query("INSERT INTO vec_commands (id, embedding) VALUES (?, ?)")
            .bind(id)
            .bind(encode_embedding(embedding))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        log::debug!("stored command entry {}", id);

        Ok(id)
    }

    /// Up to `k` entries closest to `query`, nearest first
    ///
    /// Exact scan over every stored vector. Equal distances keep insertion
    /// order. An empty store gives an empty list.
    pub async fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<MatchResult>> {
        if k == 0 {
            return Err(FastCmdError::InvalidInput("k must be at least 1".to_string()));
        }
        if query.len() != self.dimension() {
            return Err(FastCmdError::DimensionMismatch {
                expected: self.dimension(),
                actual: query.len(),
            });
        }
        ensure_finite(query)?;

        let rows = sqlx::query(
            r#"
            SELECT commands.id, commands.command, commands.description, vec_commands.embedding
            FROM vec_commands
            JOIN commands ON commands.id = vec_commands.id
            ORDER BY commands.id ASC
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let blob: Vec<u8> = row.get(3);
            let stored = decode_embedding(&blob, self.dimension())?;
            results.push(MatchResult {
                id: row.get(0),
                command: row.get(1),
                description: row.get(2),
                distance: cosine_distance(query, &stored),
            });
        }

        // Stable sort: ties stay in id order, NaN from a damaged row sorts last
        results.sort_by(|a, b| {
            a.distance
                .is_nan()
                .cmp(&b.distance.is_nan())
                .then(a.distance.total_cmp(&b.distance))
        });
        results.truncate(k);

        log::debug!("nearest: {} candidate(s) returned", results.len());

        Ok(results)
    }

    /// Every entry in insertion order. Does not touch the vector table.
    pub async fn all_entries(&self) -> Result<Vec<CommandEntry>> {
        let entries = sqlx::query_as::<_, CommandEntry>(
            "SELECT id, command, description FROM commands ORDER BY id ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(entries)
    }

    /// Get entry by ID
    pub async fn get_entry(&self, id: i64) -> Result<Option<CommandEntry>> {
        let entry = sqlx::query_as::<_, CommandEntry>(
            "SELECT id, command, description FROM commands WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(entry)
    }

    /// Number of stored entries
    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM commands")
            .fetch_one(self.pool())
            .await?;

        Ok(count)
    }
}

fn ensure_finite(embedding: &[f32]) -> Result<()> {
    match embedding.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(FastCmdError::InvalidInput(format!(
            "embedding component {} is not a finite number",
            i
        ))),
        None => Ok(()),
    }
}
