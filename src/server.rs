//! # Server Module
//!
//! HTTP server setup and route configuration.

use anyhow::{Context, Result};
use axum::http::{HeaderName, Method, header};
use axum::routing::get;
use axum::{Router, middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::jwt::JwtService;
use crate::auth::middleware::AuthMiddleware;
use crate::config::CONFIG;
use crate::database::{DatabaseConfig, DatabaseConnection};
use crate::repository::{NoteRepository, ReservationRepository, RoomRepository, UserRepository};
use crate::routes;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub jwt_service: Arc<JwtService>,
    pub users: UserRepository,
    pub rooms: RoomRepository,
    pub notes: NoteRepository,
    pub reservations: ReservationRepository,
}

impl AppState {
    pub fn new(db: DatabaseConnection, jwt_service: JwtService) -> Self {
        let pool = db.pool().clone();
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            users: UserRepository::new(pool.clone()),
            rooms: RoomRepository::new(pool.clone()),
            notes: NoteRepository::new(pool.clone()),
            reservations: ReservationRepository::new(pool),
        }
    }
}

/// Build the application router for the given state.
///
/// `/health` is unprotected; everything under `/api` except the login and
/// registration endpoints sits behind the bearer-auth middleware.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(routes::auth::protected_routes())
        .merge(routes::users::routes())
        .merge(routes::rooms::routes())
        .merge(routes::notes::routes())
        .merge(routes::reservations::routes())
        .layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            AuthMiddleware::validate_token,
        ));

    let api = Router::new()
        .merge(routes::auth::public_routes())
        .merge(protected);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
        ]);

    Router::new()
        .route("/health", get(routes::health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server: connect the pool, run migrations, serve forever.
pub async fn start() -> Result<()> {
    let config = &*CONFIG;

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.expiration_secs);

    let db_config = DatabaseConfig::from_url(&config.database.url)?
        .with_max_size(config.database.max_connections);
    let db = DatabaseConnection::new(db_config).await?;

    crate::database::migrations::run_migrations(db.pool()).await?;

    let state = AppState::new(db, jwt_service);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Health check available at http://{}/health", addr);
    tracing::info!("API endpoints available at http://{}/api/*", addr);

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    // These tests drive the full router against a scratch Postgres and are
    // skipped by default. Set TEST_DATABASE_URL and run
    // `cargo test -- --ignored` to exercise them.
    async fn test_app() -> Router {
        let url = std::env::var("TEST_DATABASE_URL")
            .expect("TEST_DATABASE_URL must point at a scratch database");
        let config = DatabaseConfig::from_url(&url).unwrap();
        let db = DatabaseConnection::new(config).await.unwrap();
        crate::database::migrations::run_migrations(db.pool())
            .await
            .unwrap();
        build_router(AppState::new(
            db,
            JwtService::new("integration-secret", 3600),
        ))
    }

    fn unique(tag: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("{tag}-{nanos}")
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register_user(app: &Router, tag: &str) -> String {
        let email = format!("{}@test.local", unique(tag));
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"name": tag, "email": email, "password": "pass1234"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_room(app: &Router, token: &str, name: &str) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/rooms",
            Some(token),
            Some(json!({"name": name, "subject": "math"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at a scratch Postgres"]
    async fn register_duplicate_email_conflicts() {
        let app = test_app().await;
        let payload = json!({
            "name": "Dup",
            "email": format!("{}@test.local", unique("dup")),
            "password": "pass1234",
        });

        let (first, _) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(payload.clone()),
        )
        .await;
        assert_eq!(first, StatusCode::CREATED);

        let (second, body) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(payload),
        )
        .await;
        assert_eq!(second, StatusCode::CONFLICT);
        assert_eq!(body["message"], "User already exists");
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at a scratch Postgres"]
    async fn join_room_twice_conflicts() {
        let app = test_app().await;
        let owner = register_user(&app, "owner").await;
        let joiner = register_user(&app, "joiner").await;
        let room_id = create_room(&app, &owner, &unique("join-room")).await;
        let uri = format!("/api/rooms/{room_id}/join");

        let (first, _) = send(&app, Method::POST, &uri, Some(&joiner), None).await;
        assert_eq!(first, StatusCode::OK);

        let (second, body) = send(&app, Method::POST, &uri, Some(&joiner), None).await;
        assert_eq!(second, StatusCode::CONFLICT);
        assert_eq!(body["message"], "User already in room");
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at a scratch Postgres"]
    async fn non_member_cannot_create_note() {
        let app = test_app().await;
        let owner = register_user(&app, "owner").await;
        let outsider = register_user(&app, "outsider").await;
        let room_id = create_room(&app, &owner, &unique("note-room")).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/notes",
            Some(&outsider),
            Some(json!({"room_id": room_id, "title": "t", "content": "c"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "User is not a member of this room");
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at a scratch Postgres"]
    async fn note_mutation_is_author_only() {
        let app = test_app().await;
        let author = register_user(&app, "author").await;
        let member = register_user(&app, "member").await;
        let room_id = create_room(&app, &author, &unique("shared-room")).await;

        let (joined, _) = send(
            &app,
            Method::POST,
            &format!("/api/rooms/{room_id}/join"),
            Some(&member),
            None,
        )
        .await;
        assert_eq!(joined, StatusCode::OK);

        let (created, note) = send(
            &app,
            Method::POST,
            "/api/notes",
            Some(&author),
            Some(json!({"room_id": room_id, "title": "t", "content": "c"})),
        )
        .await;
        assert_eq!(created, StatusCode::CREATED);
        let note_uri = format!("/api/notes/{}", note["id"].as_i64().unwrap());

        // A fellow member can read the note but not change or remove it.
        let (update, body) = send(
            &app,
            Method::PUT,
            &note_uri,
            Some(&member),
            Some(json!({"title": "t2", "content": "c2"})),
        )
        .await;
        assert_eq!(update, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Only note creator can update the note");

        let (delete, _) = send(&app, Method::DELETE, &note_uri, Some(&member), None).await;
        assert_eq!(delete, StatusCode::FORBIDDEN);

        let (update, _) = send(
            &app,
            Method::PUT,
            &note_uri,
            Some(&author),
            Some(json!({"title": "t2", "content": "c2"})),
        )
        .await;
        assert_eq!(update, StatusCode::OK);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at a scratch Postgres"]
    async fn room_mutation_is_creator_only() {
        let app = test_app().await;
        let creator = register_user(&app, "creator").await;
        let other = register_user(&app, "other").await;
        let room_id = create_room(&app, &creator, &unique("locked-room")).await;
        let uri = format!("/api/rooms/{room_id}");
        let payload = json!({"name": "renamed", "subject": "physics"});

        let (update, body) = send(
            &app,
            Method::PUT,
            &uri,
            Some(&other),
            Some(payload.clone()),
        )
        .await;
        assert_eq!(update, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Only room creator can update the room");

        let (delete, _) = send(&app, Method::DELETE, &uri, Some(&other), None).await;
        assert_eq!(delete, StatusCode::FORBIDDEN);

        let (update, _) = send(&app, Method::PUT, &uri, Some(&creator), Some(payload)).await;
        assert_eq!(update, StatusCode::OK);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at a scratch Postgres"]
    async fn rooms_sharing_a_name_resolve_to_one() {
        let app = test_app().await;
        let first_owner = register_user(&app, "first").await;
        let second_owner = register_user(&app, "second").await;

        // Room names carry no unique constraint; the lookup must still
        // return a single result instead of failing.
        let name = unique("twin-room");
        let first_id = create_room(&app, &first_owner, &name).await;
        create_room(&app, &second_owner, &name).await;

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/rooms?name={name}"),
            Some(&first_owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rooms = body.as_array().unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0]["id"].as_i64().unwrap(), first_id);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL pointing at a scratch Postgres"]
    async fn update_room_rejects_negative_capacity() {
        let app = test_app().await;
        let creator = register_user(&app, "creator").await;
        let room_id = create_room(&app, &creator, &unique("cap-room")).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/rooms/{room_id}"),
            Some(&creator),
            Some(json!({"name": "renamed", "subject": "math", "capacity": -1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Capacity must not be negative");
    }
}
