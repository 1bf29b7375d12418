use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use super::{HistoryEntry, NewHistoryEntry};

/// Almacenamiento append-only del historial de preguntas.
pub trait HistoryLog {
    /// Agrega una entrada y devuelve la entrada completa (con seq y ts).
    fn append(&mut self, question_id: Uuid, entry: NewHistoryEntry) -> HistoryEntry;
    /// Lista el historial de una pregunta (orden ascendente por seq).
    fn list(&self, question_id: Uuid) -> Vec<HistoryEntry>;
}

#[derive(Debug, Default)]
pub struct InMemoryHistoryLog {
    inner: HashMap<Uuid, Vec<HistoryEntry>>,
}

impl HistoryLog for InMemoryHistoryLog {
    fn append(&mut self, question_id: Uuid, entry: NewHistoryEntry) -> HistoryEntry {
        let vec = self.inner.entry(question_id).or_default();
        let seq = vec.len() as u64;
        let ev = HistoryEntry { seq,
                                question_id,
                                role: entry.role,
                                action: entry.action,
                                actor_id: entry.actor_id,
                                ts: Utc::now(),
                                note: entry.note };
        vec.push(ev.clone());
        ev
    }

    fn list(&self, question_id: Uuid) -> Vec<HistoryEntry> {
        self.inner.get(&question_id).cloned().unwrap_or_default()
    }
}
