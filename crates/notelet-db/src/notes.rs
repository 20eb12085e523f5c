//! Note repository implementation.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;

use notelet_core::{
    derive_summary, split_tags, CreateNoteRequest, Error, Note, NoteRepository, Result,
    UpdateNoteRequest,
};

use crate::escape_like;

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn note_from_row(row: &PgRow) -> Note {
        Note {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            content: row.get("content"),
            summary: row.get("summary"),
            tags: row.get("tags"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, owner_id: i64, req: CreateNoteRequest) -> Result<i64> {
        let title = req.title.unwrap_or_else(|| "Untitled".to_string());
        let tags = req.tags.unwrap_or_default();
        let summary = derive_summary(&req.content);

        let row = sqlx::query(
            "INSERT INTO note (user_id, title, content, summary, tags)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(owner_id)
        .bind(&title)
        .bind(&req.content)
        .bind(&summary)
        .bind(&tags)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let note_id: i64 = row.get("id");
        debug!(
            subsystem = "db",
            component = "notes",
            op = "insert",
            owner_id,
            note_id,
            "Note created"
        );
        Ok(note_id)
    }

    async fn fetch(&self, owner_id: i64, note_id: i64) -> Result<Note> {
        let row = sqlx::query(
            "SELECT id, user_id, title, content, summary, tags, created_at
             FROM note
             WHERE id = $1 AND user_id = $2",
        )
        .bind(note_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|row| Self::note_from_row(&row))
            .ok_or(Error::NoteNotFound(note_id))
    }

    async fn list(&self, owner_id: i64, tag: Option<&str>) -> Result<Vec<Note>> {
        let rows = match tag {
            Some(tag) => {
                let pattern = format!("%{}%", escape_like(tag));
                sqlx::query(
                    "SELECT id, user_id, title, content, summary, tags, created_at
                     FROM note
                     WHERE user_id = $1 AND tags LIKE $2
                     ORDER BY created_at DESC",
                )
                .bind(owner_id)
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, user_id, title, content, summary, tags, created_at
                     FROM note
                     WHERE user_id = $1
                     ORDER BY created_at DESC",
                )
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::note_from_row).collect())
    }

    async fn update(&self, owner_id: i64, note_id: i64, req: UpdateNoteRequest) -> Result<()> {
        let summary = derive_summary(&req.content);

        let result = sqlx::query(
            "UPDATE note
             SET title = $1, content = $2, summary = $3, tags = $4
             WHERE id = $5 AND user_id = $6",
        )
        .bind(&req.title)
        .bind(&req.content)
        .bind(&summary)
        .bind(&req.tags)
        .bind(note_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(note_id));
        }
        Ok(())
    }

    async fn delete(&self, owner_id: i64, note_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1 AND user_id = $2")
            .bind(note_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(note_id));
        }
        debug!(
            subsystem = "db",
            component = "notes",
            op = "delete",
            owner_id,
            note_id,
            "Note deleted"
        );
        Ok(())
    }

    async fn search(&self, owner_id: i64, query: &str) -> Result<Vec<Note>> {
        if query.trim().is_empty() {
            return Ok(vec![]);
        }
        let pattern = format!("%{}%", escape_like(query));

        let rows = sqlx::query(
            "SELECT id, user_id, title, content, summary, tags, created_at
             FROM note
             WHERE user_id = $1 AND (title LIKE $2 OR content LIKE $2)
             ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(Self::note_from_row).collect())
    }

    async fn all_tags(&self, owner_id: i64) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT tags FROM note
             WHERE user_id = $1 AND tags IS NOT NULL AND tags != ''",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut all: Vec<String> = rows
            .iter()
            .flat_map(|row| split_tags(row.get("tags")))
            .collect();
        all.sort();
        all.dedup();
        Ok(all)
    }
}
