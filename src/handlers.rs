use crate::config::Config;
use crate::enrichment::EnrichmentOrchestrator;
use crate::errors::AppError;
use crate::models::{
    AggregatedResult, CountryFacts, ErrorBody, ExchangeRates, Identity, NewsHeadline,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, services::ServeDir, trace::TraceLayer,
};
use utoipa::OpenApi;

/// Largest request body accepted before the router answers 413.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Runs the identity fetch and the enrichment branches.
    pub orchestrator: EnrichmentOrchestrator,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let orchestrator = EnrichmentOrchestrator::new(&config)?;
        Ok(Self {
            config,
            orchestrator,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(random_user, health),
    components(schemas(
        AggregatedResult,
        Identity,
        CountryFacts,
        ExchangeRates,
        NewsHeadline,
        ErrorBody
    )),
    tags((name = "explorer", description = "Random person explorer API"))
)]
pub struct ApiDoc;

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "explorer",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "random-user-explorer",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/random-user
///
/// Describes a random person: identity plus country facts, exchange rates and
/// news headlines. Enrichment sections that could not be resolved come back as
/// a fallback record or `null`; only an identity failure produces an error.
#[utoipa::path(
    get,
    path = "/api/random-user",
    tag = "explorer",
    responses(
        (status = 200, description = "Merged person description", body = AggregatedResult),
        (status = 500, description = "Identity upstream failed", body = ErrorBody)
    )
)]
pub async fn random_user(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AggregatedResult>, AppError> {
    tracing::info!("GET /api/random-user");

    let result = state.orchestrator.describe_random_person().await?;

    tracing::info!(
        "✓ Described {} {} ({})",
        result.identity.first_name,
        result.identity.last_name,
        result.country_details.country_name
    );
    Ok(Json(result))
}

/// Serves the generated OpenAPI document.
pub async fn serve_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Serves the Swagger UI HTML page, pointed at `serve_openapi_spec`.
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Random User Explorer - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Routes that sit behind the rate limiter in production.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/random-user", get(random_user))
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.json", get(serve_openapi_spec))
}

/// Assembles the full application around `api`.
///
/// `/health` stays outside `api` so it bypasses any limiter layered onto it;
/// unmatched paths are served from the static asset directory.
pub fn app(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .fallback_service(static_files)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Only GETs are served; anything with a sizeable body is rejected
                .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
