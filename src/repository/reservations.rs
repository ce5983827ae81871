//! Reservation repository
//!
//! Plain create/list queries for room bookings. No overlap or conflict
//! detection happens here.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;

use crate::database::models::{FromRow, Reservation};

#[derive(Clone)]
pub struct ReservationRepository {
    pool: Pool,
}

impl ReservationRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: i64,
        room_id: i64,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Reservation> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_one(
                "INSERT INTO reservations (user_id, room_id, start_time, end_time) \
                 VALUES ($1, $2, $3, $4) RETURNING *",
                &[&user_id, &room_id, &start_time, &end_time],
            )
            .await
            .context("Failed to insert reservation")?;
        Reservation::from_row(&row).context("Failed to read inserted reservation")
    }

    pub async fn get_by_user(&self, user_id: i64) -> Result<Vec<Reservation>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query(
                "SELECT * FROM reservations WHERE user_id = $1 ORDER BY start_time",
                &[&user_id],
            )
            .await
            .context("Failed to list reservations by user")?;
        rows.iter()
            .map(|r| Reservation::from_row(r).map_err(Into::into))
            .collect()
    }

    pub async fn get_by_room(&self, room_id: i64) -> Result<Vec<Reservation>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query(
                "SELECT * FROM reservations WHERE room_id = $1 ORDER BY start_time",
                &[&room_id],
            )
            .await
            .context("Failed to list reservations by room")?;
        rows.iter()
            .map(|r| Reservation::from_row(r).map_err(Into::into))
            .collect()
    }
}
