//! Borradores de explicación por pregunta, con expiración explícita.
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ttl_duration;
use crate::errors::WorkflowError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationDraft {
    pub question_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub saved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ExplanationDraft {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Un borrador por pregunta; guardar de nuevo reemplaza el anterior.
#[derive(Debug)]
pub struct DraftStore {
    drafts: DashMap<Uuid, ExplanationDraft>,
    ttl: Duration,
}

impl DraftStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self { drafts: DashMap::new(),
               ttl: ttl_duration(ttl_secs) }
    }

    pub fn save(&self, question_id: Uuid, author_id: Uuid, text: &str) -> Result<ExplanationDraft, WorkflowError> {
        if text.trim().is_empty() {
            return Err(WorkflowError::Validation("el borrador está vacío".into()));
        }
        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.ttl)
                            .ok_or_else(|| WorkflowError::Internal("vencimiento de borrador fuera de rango".into()))?;
        let draft = ExplanationDraft { question_id,
                                       author_id,
                                       text: text.to_string(),
                                       saved_at: now,
                                       expires_at };
        self.drafts.insert(question_id, draft.clone());
        Ok(draft)
    }

    /// Borrador vigente; uno vencido se descarta al consultarlo.
    pub fn get(&self, question_id: Uuid) -> Option<ExplanationDraft> {
        let draft = self.drafts.get(&question_id).map(|d| d.clone())?;
        if draft.is_expired(Utc::now()) {
            self.drafts.remove(&question_id);
            return None;
        }
        Some(draft)
    }

    pub fn discard(&self, question_id: Uuid) -> bool {
        self.drafts.remove(&question_id).is_some()
    }

    /// Elimina los borradores vencidos y devuelve cuántos había.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.drafts.len();
        self.drafts.retain(|_, d| !d.is_expired(now));
        before - self.drafts.len()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}
