//! Authentication Middleware
//!
//! Axum middleware for JWT token validation and user identity injection.

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{jwt::JwtService, models::AuthUser};

/// Authentication middleware that validates bearer tokens and injects the
/// caller's identity into request extensions.
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Middleware function for validating `Authorization: Bearer <token>`.
    ///
    /// Fails closed: missing header, malformed header, bad signature, wrong
    /// algorithm, or expired token all yield 401.
    pub async fn validate_token(
        State(jwt_service): State<Arc<JwtService>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, StatusCode> {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(|auth_header| auth_header.strip_prefix("Bearer "))
            .ok_or_else(|| {
                tracing::warn!("missing or malformed Authorization header");
                StatusCode::UNAUTHORIZED
            })?;

        let claims = match jwt_service.decode_claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("JWT validation failed: {:#}", e);
                return Err(StatusCode::UNAUTHORIZED);
            }
        };

        req.extensions_mut().insert(AuthUser::from(claims));

        Ok(next.run(req).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::User;
    use axum::{Extension, Router, body::Body, http::Request, middleware, routing::get};
    use chrono::Utc;
    use tower::ServiceExt;

    async fn whoami(Extension(user): Extension<AuthUser>) -> String {
        user.email
    }

    fn test_router(jwt_service: Arc<JwtService>) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(
                jwt_service,
                AuthMiddleware::validate_token,
            ))
    }

    fn test_user() -> User {
        User {
            id: 7,
            name: "Middleware Test".to_string(),
            email: "mw@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let app = test_router(Arc::new(JwtService::new("secret", 3600)));
        let res = app
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_header_is_unauthorized() {
        let jwt = Arc::new(JwtService::new("secret", 3600));
        let token = jwt.create_token(&test_user()).unwrap();
        let app = test_router(jwt);
        // Token without the Bearer prefix.
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized() {
        let app = test_router(Arc::new(JwtService::new("secret", 3600)));
        let res = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_identity() {
        let jwt = Arc::new(JwtService::new("secret", 3600));
        let token = jwt.create_token(&test_user()).unwrap();
        let app = test_router(jwt);

        let res = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"mw@example.com");
    }
}
