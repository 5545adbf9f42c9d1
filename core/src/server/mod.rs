//! HTTP surface
//!
//! Routes:
//! - `POST /utilisateurs/`: register an account
//! - `POST /utilisateurs/token`: password login, returns a bearer token
//! - `GET /utilisateurs/{email}`: account lookup (bearer)
//! - `POST /diagnostic/`: tabular risk score
//! - `POST /analyse/`: mammogram upload, returns detections and images

mod analyse;
mod auth;
mod diagnostic;
mod error;
mod users;

pub use analyse::{AnalysisResponse, IMAGE_FIELD, MAX_UPLOAD_BYTES};
pub use auth::CurrentUser;
pub use error::ApiError;
pub use users::{LoginForm, TokenResponse};

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::auth::TokenService;
use crate::detection::DetectionPipeline;
use crate::error::Result;
use crate::risk::RiskModel;
use crate::users::UserStore;

/// Origins allowed by default, the deployed front-end and local dev servers
pub const DEFAULT_ORIGINS: [&str; 6] = [
    "http://localhost.tiangolo.com",
    "https://localhost.tiangolo.com",
    "http://localhost",
    "http://localhost:8080",
    "http://localhost:5173",
    "https://projet-cancer-front.onrender.com",
];

/// Shared components handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub tokens: Arc<TokenService>,
    pub pipeline: Option<Arc<DetectionPipeline>>,
    pub risk_model: Option<Arc<dyn RiskModel>>,
    pub upload_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(users: UserStore, tokens: TokenService) -> Self {
        Self {
            users,
            tokens: Arc::new(tokens),
            pipeline: None,
            risk_model: None,
            upload_dir: None,
        }
    }

    pub fn with_pipeline(mut self, pipeline: DetectionPipeline) -> Self {
        self.pipeline = Some(Arc::new(pipeline));
        self
    }

    pub fn with_risk_model(mut self, model: Arc<dyn RiskModel>) -> Self {
        self.risk_model = Some(model);
        self
    }

    pub fn with_upload_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.upload_dir = dir;
        self
    }
}

/// Builds a CORS layer for the given origins
///
/// Credentials are allowed, so methods and headers mirror the request
/// instead of using a wildcard.
pub fn cors_layer<S: AsRef<str>>(origins: &[S]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            let origin = origin.as_ref().trim();
            HeaderValue::from_str(origin)
                .map_err(|_| warn!("Ignoring invalid CORS origin '{}'", origin))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Assembles the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/utilisateurs/", post(users::create_user))
        .route("/utilisateurs/token", post(users::login))
        .route("/utilisateurs/{email}", get(users::get_user))
        .route("/diagnostic/", post(diagnostic::diagnostic))
        .route(
            "/analyse/",
            post(analyse::analyse).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C
pub async fn serve<S: AsRef<str>>(addr: SocketAddr, state: AppState, origins: &[S]) -> Result<()> {
    let app = router(state).layer(cors_layer(origins));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[cfg(test)]
mod tests;
