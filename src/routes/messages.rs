use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ErrorResponse, HealthResponse, MessageRequest, MessageResponse};
use crate::routes::AppState;

/// Configure conversation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/messages", web::post().to(handle_message));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.records.health_check().await;

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Inbound message endpoint used by the messaging transport
///
/// POST /api/v1/messages
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "text": "string"
/// }
/// ```
async fn handle_message(
    state: web::Data<AppState>,
    req: web::Json<MessageRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    tracing::info!("Message from {} ({} chars)", req.user_id, req.text.len());

    let (reply, mode) = state
        .sessions
        .dispatch(&state.machine, &req.user_id, &req.text)
        .await;

    tracing::debug!("Replying to {} with {:?}", req.user_id, reply.kind);

    HttpResponse::Ok().json(MessageResponse {
        user_id: req.user_id.clone(),
        reply: reply.text,
        mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MachineOptions, SessionStore, SlotFillingMachine};
    use crate::models::ConversationMode;
    use crate::services::{CompletionBackend, CompletionError, MemoryRecordStore};
    use actix_web::{test, App};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct AlwaysYes;

    #[async_trait]
    impl CompletionBackend for AlwaysYes {
        async fn submit(&self, _prompt: &str) -> Result<String, CompletionError> {
            Ok("yes".to_string())
        }
    }

    fn state() -> AppState {
        let completion: Arc<dyn CompletionBackend> = Arc::new(AlwaysYes);
        let records = Arc::new(MemoryRecordStore::new());
        AppState {
            machine: Arc::new(SlotFillingMachine::new(
                completion.clone(),
                records.clone(),
                MachineOptions::default(),
            )),
            sessions: SessionStore::new(),
            records,
            completion,
        }
    }

    #[actix_web::test]
    async fn test_message_starts_collection() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/messages")
            .set_json(serde_json::json!({ "userId": "u1", "text": "I want to find csgo teammates" }))
            .to_request();
        let resp: MessageResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.user_id, "u1");
        assert_eq!(resp.mode, ConversationMode::CollectingInfo);
        assert!(resp.reply.contains("Game ID, Rank, and Contact Information"));
    }

    #[actix_web::test]
    async fn test_empty_user_id_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/messages")
            .set_json(serde_json::json!({ "userId": "", "text": "hi" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 400);
    }
}
