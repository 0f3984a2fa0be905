// Service exports
pub mod chat;
pub mod completion;
pub mod postgres;
pub mod records;

pub use chat::ChatCompletionClient;
pub use completion::{CompletionBackend, CompletionClient, CompletionError};
pub use postgres::PostgresRecordStore;
pub use records::{HttpRecordGateway, MemoryRecordStore, RecordStore, StoreError};
