use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    routing::post,
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProfileConfig;
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use crate::services::{DbInteractClient, JwtService};

/// Shared application state. Holds no profile data: the service is a
/// stateless proxy and every request round-trips to db-interact.
#[derive(Clone)]
pub struct AppState {
    pub config: ProfileConfig,
    pub jwt: JwtService,
    pub db_interact: Arc<DbInteractClient>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: ProfileConfig) -> Result<Self, AppError> {
        let jwt = JwtService::new(&config.jwt);
        let db_interact = Arc::new(DbInteractClient::new(&config.db_interact)?);

        let state = AppState {
            config: config.clone(),
            jwt,
            db_interact,
        };

        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/profiles/children",
            post(handlers::add_child).get(handlers::list_children),
        )
        .route(
            "/profiles/children/link-supervisor",
            post(handlers::link_supervisor),
        )
        .route(
            "/profiles/children/:child_id",
            get(handlers::get_child).put(handlers::update_child),
        )
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .merge(protected)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
