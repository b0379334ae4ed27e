use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, MarkerService, SeaOrmAuthService, SeaOrmMarkerService, TokenService,
};

pub mod admin;
pub mod auth;
mod error;
pub mod markers;

pub use error::ApiError;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,

    pub markers: Arc<dyn MarkerService>,
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let tokens = TokenService::new(&config.auth);
    let auth = SeaOrmAuthService::new(store.clone(), tokens, config.security.clone());

    // One-time idempotent seed, guarded by an existence check
    auth.ensure_bootstrap_admin(&config.auth).await?;

    let auth: Arc<dyn AuthService> = Arc::new(auth);
    let markers: Arc<dyn MarkerService> = Arc::new(SeaOrmMarkerService::new(store.clone()));

    Ok(Arc::new(AppState {
        config,
        store,
        auth,
        markers,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .merge(protected_routes)
        .route("/register", post(auth::register))
        .route("/token", post(auth::login))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/pending", get(admin::list_pending))
        .route("/admin/approve/{user_id}", post(admin::approve_user))
        .route("/markers", get(markers::list_markers))
        .route("/markers", post(markers::create_marker))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
