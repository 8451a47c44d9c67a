use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::{IdentityVerifier, JwtVerifier, ShapeVerifier};
use crate::config::{AppConfig, SecurityConfig, StoreKind};
use crate::database::{MemoryTaskStore, PgTaskStore, TaskStore};
use crate::handlers::{self, HandlerOptions};

/// Everything a request needs, shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub options: HandlerOptions,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, verifier: Arc<dyn IdentityVerifier>, options: HandlerOptions) -> Self {
        Self { store, verifier, options }
    }

    /// Build the store and verifier the configuration asks for
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn TaskStore> = match config.tasks.store {
            StoreKind::Memory => {
                warn!("Using in-memory task store; data is lost on restart");
                Arc::new(MemoryTaskStore::new())
            }
            StoreKind::Postgres => {
                let url = config.database_url()?;
                let store = PgTaskStore::connect(
                    url,
                    config.database.max_connections,
                    config.database.connection_timeout,
                )
                .await
                .context("failed to connect task store")?;
                store.ensure_schema().await.context("failed to prepare tasks table")?;
                Arc::new(store)
            }
        };

        Ok(Self::new(store, verifier_for(&config.security), handler_options(config)))
    }
}

pub fn handler_options(config: &AppConfig) -> HandlerOptions {
    HandlerOptions {
        auth_disabled: config.security.auth_disabled,
        list_limit: config.tasks.list_limit,
    }
}

pub fn verifier_for(security: &SecurityConfig) -> Arc<dyn IdentityVerifier> {
    if security.auth_disabled {
        warn!("Bearer-token checks are DISABLED");
    }
    match security.jwt_secret.as_deref() {
        Some(secret) => {
            info!("Verifying bearer tokens as HS256 JWTs");
            Arc::new(JwtVerifier::new(secret))
        }
        None => {
            warn!("SECURITY_JWT_SECRET not set; bearer tokens are only checked for shape");
            Arc::new(ShapeVerifier)
        }
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Token-checked inside the handler; every method lands there
        .route("/api/tasks", any(handlers::tasks_endpoint))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
