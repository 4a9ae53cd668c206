//! # Server Configuration
//!
//! This module contains the server setup and configuration for the Providers API.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::{self, TraceContext};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

/// Runs each request inside a fresh trace context so error payloads and log
/// lines share a correlation ID.
async fn trace_context_middleware(request: Request, next: Next) -> Response {
    telemetry::with_trace_context(TraceContext::new(), next.run(request)).await
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::providers::redirect_to_provider_list))
        .route("/health", get(handlers::health))
        .route(
            "/provider",
            get(handlers::providers::redirect_to_provider_list),
        )
        .route(
            "/providers",
            get(handlers::providers::redirect_to_provider_list),
        )
        .route(
            "/provider/export/csv",
            get(handlers::providers::export_providers_csv),
        )
        .route("/{locale}/provider", get(handlers::providers::list_providers))
        .route(
            "/{locale}/provider/new",
            get(handlers::providers::new_provider_form).post(handlers::providers::create_provider),
        )
        .route(
            "/{locale}/provider/{id}/edit",
            get(handlers::providers::edit_provider_form)
                .post(handlers::providers::update_provider),
        )
        .route(
            "/{locale}/provider/{id}/delete",
            axum::routing::post(handlers::providers::delete_provider),
        )
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState {
        config: Arc::new(config.clone()),
        db,
    };
    let app = create_app(state);

    // Resolve the configured bind address
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Server listening on: {}", addr);
    println!("Running in profile: {}", config.profile);

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health,
        crate::handlers::providers::list_providers,
        crate::handlers::providers::new_provider_form,
        crate::handlers::providers::create_provider,
        crate::handlers::providers::edit_provider_form,
        crate::handlers::providers::update_provider,
        crate::handlers::providers::delete_provider,
        crate::handlers::providers::export_providers_csv,
        crate::handlers::providers::redirect_to_provider_list,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::ProviderKind,
            crate::error::ApiError,
            crate::flash::FlashCategory,
            crate::flash::FlashMessage,
            crate::handlers::providers::CreateProviderRequestDto,
            crate::handlers::providers::UpdateProviderRequestDto,
            crate::handlers::providers::DeleteProviderRequestDto,
            crate::handlers::providers::ProviderDto,
            crate::handlers::providers::ProviderListDto,
            crate::handlers::providers::KindChoiceDto,
            crate::handlers::providers::ProviderFormDescriptor,
            crate::handlers::providers::ProviderResponseMeta,
        )
    ),
    info(
        title = "Providers API",
        description = "API for managing travel supplier providers",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
