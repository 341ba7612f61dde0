use crate::config::ItemsConfig;
use crate::handlers;
use crate::services::{AuthGate, ItemStore, JwtAuthGate, MongoDb, MongoItemStore, OpenAuthGate};
use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: ItemsConfig,
    pub store: Arc<dyn ItemStore>,
    pub auth: Arc<dyn AuthGate>,
}

impl AppState {
    pub fn new(config: ItemsConfig, store: Arc<dyn ItemStore>, auth: Arc<dyn AuthGate>) -> Self {
        Self {
            config,
            store,
            auth,
        }
    }
}

/// Pick the gate matching the configuration.
pub fn auth_gate_from_config(config: &ItemsConfig) -> Arc<dyn AuthGate> {
    match &config.auth.jwt_secret {
        Some(secret) => Arc::new(JwtAuthGate::new(secret)),
        None => {
            tracing::warn!("AUTH_JWT_SECRET not set, item routes are open to every caller");
            Arc::new(OpenAuthGate)
        }
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/items",
            post(handlers::create_item).get(handlers::list_items),
        )
        .route(
            "/items/",
            post(handlers::create_item).get(handlers::list_items),
        )
        .route("/items/search", get(handlers::search_items))
        .route(
            "/items/:id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/auth/signup", post(handlers::auth::signup))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
}

/// Assemble routes and middleware. The API is mounted under the configured
/// prefix; operational routes always live at the root.
pub fn build_router(state: AppState) -> Router {
    let prefix = state.config.http.api_prefix.clone();
    let timeout = state.config.http.request_timeout();

    let ops = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint));

    let app = if prefix.is_empty() {
        ops.merge(api_routes())
    } else {
        ops.nest(&prefix, api_routes())
    };

    app.layer(TimeoutLayer::new(timeout))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    db: MongoDb,
}

impl Application {
    /// Connect to MongoDB, ensure the geospatial index exists and bind the
    /// listener. The server does not accept requests until this returns.
    pub async fn build(config: ItemsConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            e
        })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let store: Arc<dyn ItemStore> = Arc::new(MongoItemStore::new(db.clone()));
        let auth = auth_gate_from_config(&config);
        let state = AppState::new(config.clone(), store, auth);

        let router = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
            db,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM, then drain and close the MongoDB pool.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        self.db.shutdown().await;
        result
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
