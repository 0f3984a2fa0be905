use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    CandidateRecord, DuplicateResponse, ErrorResponse, Field, InsertOutcome, InsertRecordRequest,
    InsertResponse, QueryResponse, RankQuery,
};
use crate::routes::AppState;
use crate::services::StoreError;

/// Configure record service routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/insert", web::post().to(insert_record))
        .route("/query", web::get().to(query_records));
}

/// Insert a record unless its game_id is already stored
///
/// POST /insert
///
/// Responds 201 when stored, 200 when the game_id already exists (the stored
/// record is left untouched), 400 when a field is blank, 500 on store failure.
async fn insert_record(
    state: web::Data<AppState>,
    req: web::Json<InsertRecordRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        let invalid = errors.field_errors();
        let missing: Vec<&str> = Field::ALL
            .iter()
            .map(|f| f.as_str())
            .filter(|name| invalid.contains_key(*name))
            .collect();

        return HttpResponse::BadRequest().json(ErrorResponse::new(
            format!("Missing fields: {}", missing.join(", ")),
            errors.to_string(),
            400,
        ));
    }

    let req = req.into_inner();
    let record = CandidateRecord::new(req.game_id, req.rank, req.contact);

    match state.records.insert(&record).await {
        Ok(InsertOutcome::Inserted(id)) => {
            tracing::info!("Inserted record {} ({})", record.game_id, id);
            HttpResponse::Created().json(InsertResponse {
                message: "Insert successful".to_string(),
                inserted_id: id,
            })
        }
        Ok(InsertOutcome::AlreadyExists) => HttpResponse::Ok().json(DuplicateResponse {
            message: "game_id already exists, not adding duplicate".to_string(),
            data: record,
        }),
        Err(StoreError::Validation(message)) => {
            HttpResponse::BadRequest().json(ErrorResponse::new(message.clone(), message, 400))
        }
        Err(e) => {
            tracing::error!("Insert of {} failed: {}", record.game_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                format!("Insert failed: {}", e),
                e.to_string(),
                500,
            ))
        }
    }
}

/// List records with the given rank
///
/// GET /query?rank={rank}
async fn query_records(
    state: web::Data<AppState>,
    query: web::Query<RankQuery>,
) -> impl Responder {
    let rank = match query.rank.as_deref().filter(|r| !r.is_empty()) {
        Some(rank) => rank,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "Missing query parameter: rank",
                "rank query parameter is required",
                400,
            ));
        }
    };

    match state.records.query_by_rank(rank).await {
        Ok(results) => HttpResponse::Ok().json(QueryResponse { results }),
        Err(e) => {
            tracing::error!("Query for rank {} failed: {}", rank, e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                format!("Query failed: {}", e),
                e.to_string(),
                500,
            ))
        }
    }
}
