//! # Database Module
//!
//! PostgreSQL integration: pooled connections, entity models, and embedded
//! migrations.

pub mod connection;
pub mod migrations;
pub mod models;

pub use connection::{DatabaseConfig, DatabaseConnection};
