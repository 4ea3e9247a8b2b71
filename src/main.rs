use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use campus_match::config::{LoggingSettings, Settings};
use campus_match::core::{
    default_intents, Assistant, ContentModerator, IntentClassifier, ProfileEncoder, RecommendationOrchestrator,
    SkillSwapEngine,
};
use campus_match::models::MatchThresholds;
use campus_match::routes::{self, AppState};
use campus_match::services::{
    EmbeddingCache, EmbeddingModel, HttpEmbeddingModel, HttpToxicityModel, InMemoryProfileStore,
    PostgresProfileStore, ProfileStore, ToxicityModel,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path extraction errors (e.g. a non-numeric user id)
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

/// `RUST_LOG` wins, then `LOG_LEVEL` / `LOG_FORMAT`, then the `[logging]` section
fn init_tracing(logging: &LoggingSettings) {
    let logging = logging
        .clone()
        .with_overrides(std::env::var("LOG_LEVEL").ok(), std::env::var("LOG_FORMAT").ok());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn ProfileStore>> {
    if let Some(database) = &settings.database {
        let store = PostgresProfileStore::from_settings(
            &database.url,
            database.max_connections,
            database.min_connections,
            database.acquire_timeout_secs,
            database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;

        let store = match database.fetch_concurrency {
            Some(n) => store.with_fetch_concurrency(n),
            None => store,
        };

        info!("PostgreSQL profile store initialized");
        return Ok(Arc::new(store));
    }

    let seed_file = &settings.store.seed_file;
    match InMemoryProfileStore::from_seed_file(seed_file).await {
        Ok(store) => Ok(Arc::new(store)),
        Err(e) => {
            warn!("No usable seed file at {} ({}), starting with an empty store", seed_file, e);
            Ok(Arc::new(InMemoryProfileStore::default()))
        }
    }
}

async fn build_embedding_model(settings: &Settings) -> Option<Arc<dyn EmbeddingModel>> {
    let url = settings.models.embedding_url.clone()?;
    let timeout = Duration::from_secs(settings.models.timeout_secs);

    match HttpEmbeddingModel::new(url.clone(), settings.models.api_key.clone(), timeout) {
        Ok(model) => {
            if !model.probe().await {
                warn!("Embedding model at {} is not reachable yet", url);
            }
            info!("Embedding model configured at {}", url);
            Some(Arc::new(model))
        }
        Err(e) => {
            warn!("Failed to build embedding client, semantic features disabled: {}", e);
            None
        }
    }
}

async fn build_toxicity_model(settings: &Settings) -> Option<Arc<dyn ToxicityModel>> {
    let url = settings.models.toxicity_url.clone()?;
    let timeout = Duration::from_secs(settings.models.timeout_secs);

    match HttpToxicityModel::new(url.clone(), settings.models.api_key.clone(), timeout) {
        Ok(model) => {
            if !model.probe().await {
                warn!("Toxicity model at {} is not reachable yet", url);
            }
            info!("Toxicity model configured at {}", url);
            Some(Arc::new(model))
        }
        Err(e) => {
            warn!("Failed to build toxicity client, moderation fails open: {}", e);
            None
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();
    init_tracing(&settings.as_ref().map(|s| s.logging.clone()).unwrap_or_default());

    info!("Starting Campus Match recommendation service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    let store = build_store(&settings).await?;

    let cache = EmbeddingCache::new(settings.cache.capacity, settings.cache.ttl_secs);
    info!(
        "Embedding cache initialized ({} entries, TTL: {}s)",
        settings.cache.capacity, settings.cache.ttl_secs
    );

    let encoder = ProfileEncoder::new(build_embedding_model(&settings).await).with_cache(cache);
    let moderator = ContentModerator::new(
        build_toxicity_model(&settings).await,
        settings.moderation.toxic_label.clone(),
        settings.moderation.threshold,
    );

    let intents = Arc::new(
        IntentClassifier::build(encoder.clone(), default_intents(), settings.assistant.intent_threshold).await,
    );

    let thresholds = MatchThresholds::from(&settings.recommendations.thresholds);
    let orchestrator = RecommendationOrchestrator::new(store, encoder, moderator)
        .with_thresholds(thresholds)
        .with_swap_engine(SkillSwapEngine::new((&settings.recommendations.skill_swap).into()))
        .with_timeout(Duration::from_secs(settings.recommendations.request_timeout_secs))
        .with_embed_concurrency(settings.recommendations.embed_concurrency);

    info!("Orchestrator initialized with thresholds: {:?}", thresholds);

    // Build application state
    let app_state = AppState {
        assistant: Assistant::new(intents, orchestrator.clone()),
        orchestrator,
        default_limit: settings.recommendations.default_limit,
        max_limit: settings.recommendations.max_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
