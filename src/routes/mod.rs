//! # Routes Module
//!
//! HTTP route handlers, organized by API domain. Each submodule exposes a
//! `Router<AppState>` builder that `server.rs` wires together.

/// Registration, login, and profile endpoints
pub mod auth;

/// Health check and monitoring endpoints
pub mod health;

/// Note endpoints
pub mod notes;

/// Reservation endpoints
pub mod reservations;

/// Room and membership endpoints
pub mod rooms;

/// User management endpoints
pub mod users;

/// Lightweight shape check for email addresses: non-empty local part, a
/// domain with at least one dot, no whitespace.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.co"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ana@nodot"));
        assert!(!is_valid_email("ana@.com"));
        assert!(!is_valid_email("ana@example."));
        assert!(!is_valid_email("ana @example.com"));
    }
}
