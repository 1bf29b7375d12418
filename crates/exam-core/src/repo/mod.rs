mod memory;
mod types;

pub use memory::InMemoryQuestionStore;
pub use types::{Observed, PendingWrite, QuestionStore, Snapshot};
