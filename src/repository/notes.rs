//! Note repository
//!
//! Note CRUD. Lookup queries join users/rooms so responses can carry author
//! and room names without extra round-trips.

use anyhow::{Context, Result};
use deadpool_postgres::Pool;

use crate::database::models::{FromRow, Note};

#[derive(Clone)]
pub struct NoteRepository {
    pool: Pool,
}

impl NoteRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: i64,
        room_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Note> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_one(
                "INSERT INTO notes (user_id, room_id, title, content) \
                 VALUES ($1, $2, $3, $4) RETURNING *",
                &[&user_id, &room_id, &title, &content],
            )
            .await
            .context("Failed to insert note")?;
        Note::from_row(&row).context("Failed to read inserted note")
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Note>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "SELECT n.*, u.name AS user_name, u.email AS user_email, r.name AS room_name \
                 FROM notes n \
                 JOIN users u ON u.id = n.user_id \
                 JOIN rooms r ON r.id = n.room_id \
                 WHERE n.id = $1",
                &[&id],
            )
            .await
            .context("Failed to query note by id")?;
        row.map(|r| Note::from_row(&r)).transpose().map_err(Into::into)
    }

    pub async fn get_by_room(&self, room_id: i64) -> Result<Vec<Note>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query(
                "SELECT n.*, u.name AS user_name, u.email AS user_email \
                 FROM notes n \
                 JOIN users u ON u.id = n.user_id \
                 WHERE n.room_id = $1 \
                 ORDER BY n.id",
                &[&room_id],
            )
            .await
            .context("Failed to list notes by room")?;
        rows.iter()
            .map(|r| Note::from_row(r).map_err(Into::into))
            .collect()
    }

    pub async fn get_by_user(&self, user_id: i64) -> Result<Vec<Note>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query(
                "SELECT n.*, r.name AS room_name \
                 FROM notes n \
                 JOIN rooms r ON r.id = n.room_id \
                 WHERE n.user_id = $1 \
                 ORDER BY n.id",
                &[&user_id],
            )
            .await
            .context("Failed to list notes by user")?;
        rows.iter()
            .map(|r| Note::from_row(r).map_err(Into::into))
            .collect()
    }

    pub async fn update(&self, id: i64, title: &str, content: &str) -> Result<u64> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let n = client
            .execute(
                "UPDATE notes SET title = $1, content = $2, updated_at = NOW() WHERE id = $3",
                &[&title, &content, &id],
            )
            .await
            .context("Failed to update note")?;
        Ok(n)
    }

    pub async fn delete(&self, id: i64) -> Result<u64> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let n = client
            .execute("DELETE FROM notes WHERE id = $1", &[&id])
            .await
            .context("Failed to delete note")?;
        Ok(n)
    }
}
