//! Note storage. Every per-user query is scoped by the owner's id.

use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct NoteStore {
    pool: SqlitePool,
}

/// A full note.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct Note {
    pub id: i64,
    pub name: String,
    pub note: String,
    pub created: String,
}

/// A note in its owner's listing (without the body).
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct NoteSummary {
    pub id: i64,
    pub name: String,
    pub created: String,
}

/// A note in the admin listing across all users.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct NoteListing {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created: String,
}

/// Result of inserting a note.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct CreatedNote {
    pub id: i64,
    pub user_id: i64,
    pub created: String,
}

impl NoteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a note for a user.
    pub async fn create(
        &self,
        user_id: i64,
        name: &str,
        note: &str,
    ) -> Result<CreatedNote, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO notes (user_id, name, note) VALUES (?, ?, ?)
             RETURNING id, user_id, created",
        )
        .bind(user_id)
        .bind(name)
        .bind(note)
        .fetch_one(&self.pool)
        .await
    }

    /// List a user's notes, oldest first.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<NoteSummary>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, created FROM notes WHERE user_id = ? ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    /// List notes of all users, newest first.
    pub async fn list_all(&self, offset: i64, limit: i64) -> Result<Vec<NoteListing>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, user_id, name, created FROM notes
             ORDER BY created DESC, id DESC
             LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Get a note. Only returns the note if it belongs to the given user.
    pub async fn get(&self, user_id: i64, note_id: i64) -> Result<Option<Note>, sqlx::Error> {
        sqlx::query_as("SELECT id, name, note, created FROM notes WHERE id = ? AND user_id = ?")
            .bind(note_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Replace a note's body. Returns true if the note exists and belongs to the user.
    pub async fn update(
        &self,
        user_id: i64,
        note_id: i64,
        note: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE notes SET note = ? WHERE id = ? AND user_id = ?")
            .bind(note)
            .bind(note_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a note. Returns true if the note exists and belonged to the user.
    pub async fn delete(&self, user_id: i64, note_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(note_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
