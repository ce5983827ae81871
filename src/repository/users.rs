//! User repository
//!
//! Translates user domain operations into single-statement SQL. "Not found"
//! is a distinguished `Ok(None)` (or a zero row count), never an error.

use anyhow::{Context, Result};
use deadpool_postgres::Pool;

use crate::database::models::{FromRow, User};

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool,
}

impl UserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_one(
                "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
                &[&name, &email, &password_hash],
            )
            .await
            .context("Failed to insert user")?;
        User::from_row(&row).context("Failed to read inserted user")
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt("SELECT * FROM users WHERE id = $1", &[&id])
            .await
            .context("Failed to query user by id")?;
        row.map(|r| User::from_row(&r)).transpose().map_err(Into::into)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt("SELECT * FROM users WHERE email = $1", &[&email])
            .await
            .context("Failed to query user by email")?;
        row.map(|r| User::from_row(&r)).transpose().map_err(Into::into)
    }

    pub async fn get_all(&self) -> Result<Vec<User>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query("SELECT * FROM users ORDER BY id", &[])
            .await
            .context("Failed to list users")?;
        rows.iter()
            .map(|r| User::from_row(r).map_err(Into::into))
            .collect()
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<u64> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let n = client
            .execute(
                "UPDATE users SET name = $1, email = $2, password_hash = $3, updated_at = NOW() \
                 WHERE id = $4",
                &[&name, &email, &password_hash, &id],
            )
            .await
            .context("Failed to update user")?;
        Ok(n)
    }

    /// Returns the number of deleted rows (0 when the user did not exist).
    pub async fn delete(&self, id: i64) -> Result<u64> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let n = client
            .execute("DELETE FROM users WHERE id = $1", &[&id])
            .await
            .context("Failed to delete user")?;
        Ok(n)
    }
}
