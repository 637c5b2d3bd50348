use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use exhibitor_match::config::{LogFormat, Settings};
use exhibitor_match::core::Matcher;
use exhibitor_match::models::ScoringWeights;
use exhibitor_match::routes::{self, AppState};
use exhibitor_match::services::{
    CacheManager, CatalogSource, EventxClient, InMemorySavedMatchRepository, MatchmakingService,
    PostgresSavedMatchRepository, SavedMatchRepository,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
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
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
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

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Compact => subscriber.compact().init(),
    }
}

async fn build_repository(settings: &Settings) -> Arc<dyn SavedMatchRepository> {
    let db = &settings.database;
    let Some(url) = db.url.as_deref().filter(|url| !url.trim().is_empty()) else {
        warn!("No database configured, saved matches are kept in memory");
        return Arc::new(InMemorySavedMatchRepository::new());
    };

    let max_connections = db.max_connections.unwrap_or(10);
    match PostgresSavedMatchRepository::connect(
        url,
        max_connections,
        db.min_connections.unwrap_or(1),
        db.acquire_timeout_secs.unwrap_or(5),
        db.idle_timeout_secs.unwrap_or(600),
    )
    .await
    {
        Ok(repo) => {
            info!("PostgreSQL saved match store initialized (max: {} connections)", max_connections);
            Arc::new(repo)
        }
        Err(e) => {
            error!("Failed to connect to PostgreSQL ({}), saved matches are kept in memory", e);
            Arc::new(InMemorySavedMatchRepository::new())
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_tracing(&settings.logging.level, settings.logging.log_format());
    info!("Starting exhibitor matchmaking service...");

    let eventx = Arc::new(
        EventxClient::new(
            settings.eventx.base_url.clone(),
            settings.eventx.event_id,
            settings.eventx.token.clone(),
            settings.eventx.timeout_secs,
        )
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    );
    info!("EventX client initialized for event {}", eventx.event_id());

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);
    let cache = Arc::new(
        CacheManager::new(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl).await,
    );
    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, shared: {})",
        l1_cache_size,
        cache_ttl,
        cache.stats().shared_tier
    );

    let catalog = CatalogSource::new(eventx.clone(), eventx, cache, settings.eventx.event_id);
    let repository = build_repository(&settings).await;

    let weights = ScoringWeights::from(&settings.scoring.weights);
    let matcher = Matcher::new(weights, settings.matching.ranker());
    info!("Matcher initialized with weights: {:?}", weights);

    let service = Arc::new(MatchmakingService::new(
        matcher,
        catalog,
        repository,
        settings.matching.session_ttl(),
        (&settings.persistence).into(),
    ));

    let app_state = AppState { service };

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
