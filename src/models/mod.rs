// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CandidateRecord, ConversationMode, ConversationState, Field, InsertOutcome, Intent, StoredRecord};
pub use requests::{InsertRecordRequest, MessageRequest, RankQuery, SubmitRequest};
pub use responses::{DuplicateResponse, ErrorResponse, HealthResponse, InsertResponse, MessageResponse, QueryResponse, SubmitResponse};
