//! Vantage Web Server
//!
//! Axum-based REST API over a Vantage data source.
//!
//! Every route is a read: the dataset is shared, immutable state behind an
//! [`InsightStore`], so requests are handled independently.
//!
//! Security features:
//! - Restrictive CORS policy (configured origins only)
//! - Input validation (pagination limits, sort fields)
//! - Sanitized error responses

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use vantage_core::models::Pagination;
use vantage_core::{InsightStore, ServerSettings};

mod handlers;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only, `*` = any)
    pub allowed_origins: Vec<String>,
    /// Deployment environment reported by the health endpoint
    pub environment: String,
    /// Built dashboard frontend, served for non-API paths
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            environment: "development".to_string(),
            static_dir: None,
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            allowed_origins: settings.allowed_origins.clone(),
            environment: settings.environment.clone(),
            static_dir: settings.static_dir.clone(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn InsightStore>,
    pub config: ServerConfig,
}

/// Success envelope: `{success: true, data}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

/// Success envelope for a result page
#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Create the application router
pub fn create_router(store: Arc<dyn InsightStore>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        store,
        config: config.clone(),
    });

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Insights
        .route("/insights", get(handlers::list_insights))
        .route("/insights/filters", get(handlers::get_filter_options))
        .route("/insights/stats", get(handlers::get_stats))
        .route("/insights/:id", get(handlers::get_insight))
        // Short aliases used by the dashboard's chart widgets
        .route("/filters", get(handlers::get_filter_options))
        .route("/stats", get(handlers::get_stats))
        .fallback(handlers::route_not_found);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);
    let cors = if config.allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        cors
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    };

    // Security headers
    // CSP: the dashboard bundle is same-origin; charts render inline styles
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );
    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    let app = Router::new().nest("/api", api_routes);

    // Serve the frontend if a directory is provided, otherwise an API index
    let app = match &config.static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app
            .route("/", get(handlers::index))
            .fallback(handlers::route_not_found),
    };

    app.with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(security_headers)
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    store: Arc<dyn InsightStore>,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let records = store.count()?;
    info!(
        source = %store.kind(),
        records,
        environment = %config.environment,
        "Data source ready"
    );
    if let Some(dir) = &config.static_dir {
        info!(dir = %dir.display(), "Serving dashboard frontend");
    }

    let app = create_router(store, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            // Wait for shutdown signal
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    info!("Server stopped");
    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Generic message for failures whose details stay in the server log
const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Application error type with proper HTTP status codes
///
/// Serialized as `{success: false, message, error}` where `error` is a
/// stable machine-readable kind.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    kind: &'static str,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            kind: "invalid_parameter",
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            kind: "not_found",
            internal: None,
        }
    }

    /// Map a core error onto an HTTP status
    fn from_core(err: vantage_core::Error) -> Self {
        use vantage_core::Error;

        match err {
            Error::NotFound(msg) => Self::not_found(&msg),
            Error::InvalidParameter(msg) => Self::bad_request(&msg),
            other => {
                let message = match other {
                    Error::DataSourceUnavailable(_) | Error::Pool(_) => "Data source unavailable",
                    _ => INTERNAL_ERROR_MESSAGE,
                };
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: message.to_string(),
                    kind: other.kind(),
                    internal: Some(other.into()),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, kind = self.kind, "Request failed");
        }

        let body = Json(serde_json::json!({
            "success": false,
            "message": self.message,
            "error": self.kind,
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        match err.downcast::<vantage_core::Error>() {
            Ok(core) => Self::from_core(core),
            Err(err) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: INTERNAL_ERROR_MESSAGE.to_string(),
                kind: "internal",
                // Keep full error for logging
                internal: Some(err),
            },
        }
    }
}
