//! exam-core: Motor de workflow de revisión de preguntas (W1)
pub mod assignment;
pub mod config;
pub mod constants;
pub mod drafts;
pub mod engine;
pub mod errors;
pub mod flag;
pub mod history;
pub mod notify;
pub mod repo;
pub mod routing;

pub use assignment::{requires_assignment, AssignmentResolver, InMemoryUserDirectory, UserDirectory};
pub use config::WorkflowConfig;
pub use drafts::{DraftStore, ExplanationDraft};
pub use engine::{Action, ActionKind, Actor, Availability, CommandOutcome, WorkflowEngine};
pub use errors::{classify_error, ErrorClass, WorkflowError};
pub use history::{HistoryAction, HistoryEntry, HistoryLog, InMemoryHistoryLog, NewHistoryEntry};
pub use notify::Notification;
pub use repo::{InMemoryQuestionStore, Observed, PendingWrite, QuestionStore, Snapshot};
pub use routing::{current_queue, next_destination, Destination};
