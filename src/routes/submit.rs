use actix_web::{web, HttpResponse, Responder};
use crate::models::{ErrorResponse, SubmitRequest, SubmitResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/submit", web::post().to(submit));
}

/// Single-turn completion passthrough
///
/// POST /submit with `{"prompt": "..."}`
async fn submit(
    state: web::Data<AppState>,
    req: web::Json<SubmitRequest>,
) -> impl Responder {
    let prompt = match req.prompt.as_deref() {
        Some(prompt) => prompt,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "Missing 'prompt' parameter",
                "prompt is required",
                400,
            ));
        }
    };

    match state.completion.submit(prompt).await {
        Ok(response) => HttpResponse::Ok().json(SubmitResponse { response }),
        Err(e) => {
            tracing::error!("Completion passthrough failed: {}", e);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                "Completion failed",
                e.to_string(),
                502,
            ))
        }
    }
}
