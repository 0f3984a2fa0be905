use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use squad_finder::config::{CompletionBackendKind, LoggingSettings, Settings, StoreBackendKind, DEFAULT_TIMEOUT_SECS};
use squad_finder::core::{MachineOptions, SessionStore, SlotFillingMachine};
use squad_finder::routes::{self, AppState};
use squad_finder::services::{
    ChatCompletionClient, CompletionBackend, CompletionClient, HttpRecordGateway,
    MemoryRecordStore, PostgresRecordStore, RecordStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
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
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "No JSON data provided".to_string(),
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

/// LOG_LEVEL / LOG_FORMAT override the configured logging section
fn init_logging(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn timeout(secs: Option<u64>) -> Duration {
    Duration::from_secs(secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
}

fn config_error(e: impl std::fmt::Display) -> std::io::Error {
    error!("Configuration error: {}", e);
    std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // SQUAD_CONFIG points at a single settings file instead of config/
    let settings = match std::env::var("SQUAD_CONFIG") {
        Ok(path) => Settings::load_from(path),
        Err(_) => Settings::load(),
    };

    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    init_logging(&logging);

    info!("Starting Squad Finder service...");

    // Missing connection parameters are fatal before anything is served
    let settings = settings.map_err(config_error)?;

    info!("Configuration loaded successfully");

    let completion: Arc<dyn CompletionBackend> = match settings.completion.backend {
        CompletionBackendKind::Service => {
            let url = settings.completion.service_url.clone().unwrap_or_default();
            info!("Using completion service at {}", url);
            Arc::new(
                CompletionClient::new(url, timeout(settings.completion.timeout_secs))
                    .map_err(config_error)?,
            )
        }
        CompletionBackendKind::Chat => {
            let chat = settings.chat.clone();
            info!("Using chat deployment {:?}", chat.model_name);
            Arc::new(
                ChatCompletionClient::new(
                    chat.base_url.unwrap_or_default(),
                    chat.model_name.unwrap_or_default(),
                    chat.api_version.unwrap_or_default(),
                    chat.access_token.unwrap_or_default(),
                    timeout(settings.completion.timeout_secs),
                )
                .map_err(config_error)?,
            )
        }
    };

    let records: Arc<dyn RecordStore> = match settings.store.backend {
        StoreBackendKind::Http => {
            let url = settings.store.service_url.clone().unwrap_or_default();
            info!("Using record service at {}", url);
            Arc::new(
                HttpRecordGateway::new(url, timeout(settings.store.timeout_secs))
                    .map_err(config_error)?,
            )
        }
        StoreBackendKind::Postgres => {
            let db = &settings.database;
            let store = PostgresRecordStore::from_settings(
                db.url.as_deref().unwrap_or_default(),
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;
            info!("PostgreSQL record store initialized");
            Arc::new(store)
        }
        StoreBackendKind::Memory => {
            info!("Using in-memory record store");
            Arc::new(MemoryRecordStore::new())
        }
    };

    let options = MachineOptions {
        game: settings.conversation.game.clone(),
        retain_partial_on_failure: settings.conversation.retain_partial_on_failure,
    };

    info!("State machine initialized with {:?}", options);

    let app_state = AppState {
        machine: Arc::new(SlotFillingMachine::new(completion.clone(), records.clone(), options)),
        sessions: SessionStore::new(),
        records,
        completion,
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
