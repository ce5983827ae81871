//! Room repository
//!
//! Room CRUD plus the membership operations that back room-level
//! authorization: join, leave, membership check, member count, and the
//! rooms-for-user inner join.

use anyhow::{Context, Result};
use deadpool_postgres::Pool;

use crate::database::models::{FromRow, Room, RoomMember};

#[derive(Clone)]
pub struct RoomRepository {
    pool: Pool,
}

impl RoomRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        description: &str,
        subject: &str,
        capacity: i32,
        created_by: i64,
    ) -> Result<Room> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_one(
                "INSERT INTO rooms (name, description, subject, capacity, created_by) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING *",
                &[&name, &description, &subject, &capacity, &created_by],
            )
            .await
            .context("Failed to insert room")?;
        Room::from_row(&row).context("Failed to read inserted room")
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Room>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt("SELECT * FROM rooms WHERE id = $1", &[&id])
            .await
            .context("Failed to query room by id")?;
        row.map(|r| Room::from_row(&r)).transpose().map_err(Into::into)
    }

    /// Room names are not unique; return the oldest match.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Room>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt(
                "SELECT * FROM rooms WHERE name = $1 ORDER BY id LIMIT 1",
                &[&name],
            )
            .await
            .context("Failed to query room by name")?;
        row.map(|r| Room::from_row(&r)).transpose().map_err(Into::into)
    }

    pub async fn get_all(&self) -> Result<Vec<Room>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query("SELECT * FROM rooms ORDER BY id", &[])
            .await
            .context("Failed to list rooms")?;
        rows.iter()
            .map(|r| Room::from_row(r).map_err(Into::into))
            .collect()
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        description: &str,
        subject: &str,
        capacity: i32,
    ) -> Result<u64> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let n = client
            .execute(
                "UPDATE rooms SET name = $1, description = $2, subject = $3, capacity = $4, \
                 updated_at = NOW() WHERE id = $5",
                &[&name, &description, &subject, &capacity, &id],
            )
            .await
            .context("Failed to update room")?;
        Ok(n)
    }

    pub async fn delete(&self, id: i64) -> Result<u64> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let n = client
            .execute("DELETE FROM rooms WHERE id = $1", &[&id])
            .await
            .context("Failed to delete room")?;
        Ok(n)
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    pub async fn join(&self, user_id: i64, room_id: i64, role: &str) -> Result<()> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        client
            .execute(
                "INSERT INTO room_members (user_id, room_id, role) VALUES ($1, $2, $3)",
                &[&user_id, &room_id, &role],
            )
            .await
            .context("Failed to insert room membership")?;
        Ok(())
    }

    /// Returns the number of removed memberships (0 when not a member).
    pub async fn leave(&self, user_id: i64, room_id: i64) -> Result<u64> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let n = client
            .execute(
                "DELETE FROM room_members WHERE user_id = $1 AND room_id = $2",
                &[&user_id, &room_id],
            )
            .await
            .context("Failed to delete room membership")?;
        Ok(n)
    }

    pub async fn is_member(&self, user_id: i64, room_id: i64) -> Result<bool> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_one(
                "SELECT EXISTS(SELECT 1 FROM room_members WHERE user_id = $1 AND room_id = $2)",
                &[&user_id, &room_id],
            )
            .await
            .context("Failed to check room membership")?;
        Ok(row.get(0))
    }

    pub async fn member_count(&self, room_id: i64) -> Result<i64> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_one(
                "SELECT COUNT(*) FROM room_members WHERE room_id = $1",
                &[&room_id],
            )
            .await
            .context("Failed to count room members")?;
        Ok(row.get(0))
    }

    pub async fn members(&self, room_id: i64) -> Result<Vec<RoomMember>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query(
                "SELECT m.user_id, m.room_id, m.role, m.created_at, \
                        u.name AS user_name, u.email AS user_email \
                 FROM room_members m \
                 JOIN users u ON u.id = m.user_id \
                 WHERE m.room_id = $1 \
                 ORDER BY m.created_at",
                &[&room_id],
            )
            .await
            .context("Failed to list room members")?;
        rows.iter()
            .map(|r| RoomMember::from_row(r).map_err(Into::into))
            .collect()
    }

    /// Rooms the user belongs to (inner join on membership).
    pub async fn rooms_for_user(&self, user_id: i64) -> Result<Vec<Room>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query(
                "SELECT r.* FROM rooms r \
                 JOIN room_members m ON m.room_id = r.id \
                 WHERE m.user_id = $1 \
                 ORDER BY r.id",
                &[&user_id],
            )
            .await
            .context("Failed to list rooms for user")?;
        rows.iter()
            .map(|r| Room::from_row(r).map_err(Into::into))
            .collect()
    }
}
