// Conversation core exports
pub mod classifier;
pub mod extraction;
pub mod machine;
pub mod session;
pub mod slots;

pub use classifier::{interpret, IntentClassifier};
pub use extraction::{parse_extraction, ExtractionError, ExtractionService};
pub use machine::{MachineOptions, Reply, ReplyKind, SlotFillingMachine};
pub use session::SessionStore;
pub use slots::{is_complete, is_present, merge, missing_fields};
