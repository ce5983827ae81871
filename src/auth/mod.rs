//! # Authentication Module
//!
//! JWT token issuance/validation, password hashing, and the middleware that
//! secures protected API endpoints.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
