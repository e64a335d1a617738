//! rrcheck REST API server.
//!
//! Serves the method catalog and the r/R check over HTTP.
//!
//! Run with: `cargo run --bin rrcheck-server --features server`
//!
//! Environment variables:
//! - `RRCHECK_PORT` - Port to listen on (default: 8080)
//! - `RRCHECK_HOST` - Host to bind to (default: 0.0.0.0)
//! - `RRCHECK_CATALOG` - Method catalog CSV (default: methods.csv)
//! - `RRCHECK_API_TOKEN` - Bearer token for authentication (optional, if set all requests require it)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rrcheck::catalog::load::load_catalog;
use rrcheck::catalog::method::{Catalog, MethodDefinition};
use rrcheck::cli::args::DEFAULT_CATALOG;
use rrcheck::cli::exit::Outcome;
use rrcheck::output::human::format_result;
use rrcheck::output::json::{Formulas, JsonOutput};
use rrcheck::orchestrator;

/// Server configuration from environment.
#[derive(Clone)]
struct Config {
    port: u16,
    host: String,
    catalog: PathBuf,
    api_token: Option<String>,
}

impl Config {
    fn from_env() -> Self {
        Self {
            port: std::env::var("RRCHECK_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            host: std::env::var("RRCHECK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            catalog: std::env::var("RRCHECK_CATALOG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATALOG)),
            api_token: std::env::var("RRCHECK_API_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Loaded once at startup; read-only afterwards.
struct AppState {
    api_token: Option<String>,
    catalog: Catalog,
    catalog_error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rrcheck_server=info,rrcheck=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    if config.api_token.is_some() {
        tracing::info!("API token authentication enabled");
    } else {
        tracing::warn!("No RRCHECK_API_TOKEN set - API is unauthenticated");
    }

    // A broken catalog leaves the server up with no methods.
    let (catalog, catalog_error) = match load_catalog(&config.catalog) {
        Ok(catalog) => {
            tracing::info!(
                path = %config.catalog.display(),
                methods = catalog.len(),
                "catalog loaded"
            );
            (catalog, None)
        }
        Err(err) => {
            tracing::error!(path = %config.catalog.display(), error = %err, "catalog unavailable");
            (Catalog::empty(), Some(err.to_string()))
        }
    };

    let state = Arc::new(AppState {
        api_token: config.api_token,
        catalog,
        catalog_error,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/methods", get(list_methods))
        .route("/methods/{name}", get(get_method))
        .route("/calculate", post(calculate))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("rrcheck-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        methods: state.catalog.len(),
        catalog_error: state.catalog_error.clone(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    methods: usize,
    catalog_error: Option<String>,
}

async fn list_methods(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let methods: Vec<&MethodDefinition> = state.catalog.iter().collect();
    Json(methods).into_response()
}

async fn get_method(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    match state.catalog.get(&name) {
        Some(method) => Json(method).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("unknown method \"{name}\"")),
    }
}

#[derive(Deserialize)]
struct CalculateRequest {
    method: Option<String>,
    value1: f64,
    value2: f64,
    #[serde(default)]
    show_formulas: bool,
}

#[derive(Serialize)]
struct CalculateResponse {
    #[serde(flatten)]
    document: JsonOutput,
    report: String,
}

/// Run the r/R check.
///
/// Accepts JSON `{"method": "...", "value1": 1.0, "value2": 2.0}`.
/// Requires `Authorization: Bearer <token>` header if `RRCHECK_API_TOKEN` is set.
async fn calculate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CalculateRequest>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }

    match orchestrator::evaluate(
        &state.catalog,
        request.method.as_deref(),
        request.value1,
        request.value2,
    ) {
        Ok(evaluation) => {
            let passed = evaluation.outcome() == Outcome::Pass;
            let formulas = request
                .show_formulas
                .then(|| Formulas::of(evaluation.method));
            let report = format_result(&evaluation.result);
            tracing::info!(method = %evaluation.method.name, passed, "calculated");
            let body = CalculateResponse {
                document: JsonOutput::verdict(evaluation.result, formulas),
                report,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(refusal) => {
            tracing::info!(code = %refusal.code, "refused");
            let body = JsonOutput::refusal(request.method, &refusal);
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
    }
}

/// Check bearer token if configured.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected_token) = &state.api_token else {
        return Ok(());
    };
    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let provided_token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .unwrap_or("");

    if provided_token != expected_token {
        return Err(error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid or missing bearer token".to_string(),
        ));
    }
    Ok(())
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}
