//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{MessagesApiAdapter, SqliteKvAdapter},
    config::{Config, StoreBackend},
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tutor_core::{store::ensure_schema_version, InMemoryStore, KeyValueStore};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Store & Run Migrations ---
    let store: Arc<dyn KeyValueStore> = match &config.store {
        StoreBackend::Memory => {
            info!("Using the in-memory store; nothing will survive a restart.");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Sqlite(url) => {
            info!("Connecting to database...");
            let adapter = SqliteKvAdapter::connect(url).await?;
            info!("Running database migrations...");
            adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(adapter)
        }
    };
    let version = ensure_schema_version(store.as_ref()).await?;
    info!("Store schema version {}", version);

    // --- 3. Initialize the Model Client ---
    if config.model_api_key.is_none() {
        info!("MODEL_API_KEY is not set; requests go to {} unauthenticated.", config.model_api_url);
    }
    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))?;
    let model = Arc::new(MessagesApiAdapter::new(
        http,
        config.model_api_url.clone(),
        config.model_name.clone(),
        config.model_max_tokens,
        config.model_api_key.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        store,
        model,
        config.teacher_passphrase.clone(),
    ));

    let origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!(
            "Invalid ALLOWED_ORIGIN '{}': {}",
            config.allowed_origin, e
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
