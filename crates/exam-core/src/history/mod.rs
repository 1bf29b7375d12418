//! Historial append-only de cada pregunta y consultas sobre él.

mod query;
mod store;
mod types;

pub use query::*;
pub use store::{HistoryLog, InMemoryHistoryLog};
pub use types::{HistoryAction, HistoryEntry, NewHistoryEntry};
