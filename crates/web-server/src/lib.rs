//! HTTP surface for one microforum service instance.
//!
//! The dispatcher is constructed, never ambient: `run_server` receives the
//! already-connected pool, finishes bootstrap (schema + seed), opens the
//! readiness gate and only then binds the listener. Handlers read everything
//! they need from the injected `AppState`, so tests can substitute a fake
//! store by building the state themselves.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use database::{DbError, DbRepository, MySqlPool, ServiceKind};

pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub repo: DbRepository,
    pub service: ServiceKind,
    ready: AtomicBool,
    started: Instant,
}

impl AppState {
    /// Builds the state around an injected pool. The readiness gate starts
    /// closed; `mark_ready` opens it once bootstrap has succeeded.
    pub fn new(pool: MySqlPool, service: ServiceKind) -> Arc<Self> {
        Arc::new(Self {
            repo: DbRepository::new(pool),
            service,
            ready: AtomicBool::new(false),
            started: Instant::now(),
        })
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// Runs schema creation and seeding, then opens the readiness gate.
///
/// A schema failure is fatal; the caller aborts startup. A seed failure is
/// logged and startup continues: the seed transaction rolled back, the table
/// exists but is empty, and the next process start retries a clean seed.
pub async fn bootstrap(state: &AppState) -> Result<(), DbError> {
    database::bootstrap::ensure_schema(state.repo.pool(), state.service).await?;

    match database::seed::seed_if_empty(state.repo.pool(), state.service).await {
        Ok(0) => {}
        Ok(inserted) => tracing::info!(inserted, "seeded initial dataset"),
        Err(error) => {
            tracing::warn!(%error, "seeding failed; continuing with an unseeded table");
        }
    }

    state.mark_ready();
    Ok(())
}

/// Assembles the router for one service instance.
///
/// Entity routes are mounted twice, at the root (load-balancer friendly) and
/// under `/api`, mirroring the public surface the services have always had.
pub fn app(state: Arc<AppState>) -> Router {
    let api = entity_routes(state.service).route("/", get(handlers::api_root));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(health::health))
        .merge(entity_routes(state.service))
        // Nesting flattens the inner `/` route onto `/api` itself, so the
        // trailing-slash form needs its own mount to serve the same handler.
        .route("/api/", get(handlers::api_root))
        .nest("/api", api)
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(state)
}

fn entity_routes(service: ServiceKind) -> Router<Arc<AppState>> {
    match service {
        ServiceKind::Users => Router::new()
            .route("/users", get(handlers::list_users).post(handlers::create_user))
            .route("/users/:id", get(handlers::get_user)),
        ServiceKind::Threads => Router::new()
            .route(
                "/threads",
                get(handlers::list_threads).post(handlers::create_thread),
            )
            .route("/threads/:id", get(handlers::get_thread)),
        ServiceKind::Posts => Router::new()
            .route("/posts", get(handlers::list_posts).post(handlers::create_post))
            .route("/posts/:id", get(handlers::get_post))
            .route("/posts/in-thread/:thread_id", get(handlers::posts_in_thread))
            .route("/posts/by-user/:user_id", get(handlers::posts_by_user)),
    }
}

/// The main function to configure and run the web server.
///
/// Bootstrap completes before the listener binds, so no request can observe a
/// missing table; the readiness gate additionally answers any early or
/// degraded traffic with a definite 503.
pub async fn run_server(
    addr: SocketAddr,
    pool: MySqlPool,
    service: ServiceKind,
) -> anyhow::Result<()> {
    let state = AppState::new(pool, service);
    bootstrap(&state).await?;

    let app = app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, service = %service, "service listening");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// State whose pool points at a closed port; construction is lazy so no
    /// connection is attempted until a handler actually queries.
    fn unreachable_state(service: ServiceKind) -> Arc<AppState> {
        let settings = configuration::Settings {
            db_host: Some("127.0.0.1".to_string()),
            db_pass: Some("nope".to_string()),
            db_port: 9,
            ..Default::default()
        };
        let pool = database::connection::connect_lazy(&settings).unwrap();
        AppState::new(pool, service)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_reports_the_service_name() {
        let app = app(unreachable_state(ServiceKind::Users));
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"users service OK");
    }

    #[tokio::test]
    async fn api_root_is_static() {
        let app = app(unreachable_state(ServiceKind::Threads));
        let response = app
            .oneshot(Request::get("/api/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_is_rejected_until_bootstrap_completes() {
        let app = app(unreachable_state(ServiceKind::Users));
        let response = app
            .oneshot(
                Request::post("/users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"Bea","email":"b@x.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_client_error() {
        let app = app(unreachable_state(ServiceKind::Users));
        let response = app
            .oneshot(Request::get("/users/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_positive_id_is_a_client_error() {
        let app = app(unreachable_state(ServiceKind::Threads));
        let response = app
            .oneshot(Request::get("/threads/0").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_create_body_is_a_client_error() {
        let state = unreachable_state(ServiceKind::Posts);
        state.mark_ready();
        let app = app(state);
        let response = app
            .oneshot(
                Request::post("/posts")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"body":"missing references"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn foreign_key_routes_exist_only_on_the_posts_service() {
        let app = app(unreachable_state(ServiceKind::Users));
        let response = app
            .oneshot(
                Request::get("/posts/in-thread/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_not_ready_before_bootstrap() {
        let app = app(unreachable_state(ServiceKind::Users));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["live"], true);
        assert_eq!(body["ready"], false);
        assert_eq!(body["service"], "users");
    }

    #[tokio::test]
    #[ignore = "requires a live MySQL instance"]
    async fn health_reports_ready_once_the_database_is_reachable() {
        // Counterpart of the degraded test below: with connectivity present,
        // the next probe must come back ready.
        let settings = configuration::load_settings().expect("DB_* environment not configured");
        let pool = database::connection::connect(&settings)
            .await
            .expect("database unreachable");
        let state = AppState::new(pool, ServiceKind::Users);
        bootstrap(&state).await.unwrap();

        let app = app(state);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["live"], true);
        assert_eq!(body["ready"], true);
    }

    #[tokio::test]
    async fn health_reports_degraded_when_the_database_is_unreachable() {
        let state = unreachable_state(ServiceKind::Posts);
        // Gate open, but the round trip to the dead address must fail.
        state.mark_ready();
        let app = app(state);
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["live"], true);
        assert_eq!(body["ready"], false);
        assert!(body["detail"].is_string());
    }
}
