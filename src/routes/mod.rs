// Route exports
pub mod messages;
pub mod records;
pub mod submit;

use crate::core::{SessionStore, SlotFillingMachine};
use crate::services::{CompletionBackend, RecordStore};
use actix_web::web;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub machine: Arc<SlotFillingMachine>,
    pub sessions: SessionStore,
    pub records: Arc<dyn RecordStore>,
    pub completion: Arc<dyn CompletionBackend>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(messages::configure),
    )
    // Record and completion endpoints keep their unversioned paths
    .configure(records::configure)
    .configure(submit::configure);
}
