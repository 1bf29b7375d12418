//! Contrato de persistencia que consume el motor.
//!
//! El motor nunca escribe una pregunta sin su entrada de historial: toda
//! escritura pasa por `apply_writes`, que confirma el lote completo o nada.
//! El control de concurrencia es optimista: cada pregunta existente viaja con
//! el `Observed` que el cliente vio y el store rechaza con `Conflict` si el
//! estado almacenado ya no coincide.
use exam_domain::{FlagStatus, Question, QuestionStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::WorkflowError;
use crate::history::{HistoryEntry, NewHistoryEntry};

/// Par `{status, flag_status}` que el cliente vio por última vez.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observed {
    pub status: QuestionStatus,
    pub flag_status: FlagStatus,
}

impl Observed {
    pub fn of(question: &Question) -> Self {
        Self { status: question.status,
               flag_status: question.flag_status }
    }

    pub fn matches(&self, question: &Question) -> bool {
        *self == Observed::of(question)
    }
}

/// Estado leído de una pregunta: la pregunta, su historial y sus variantes.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub question: Question,
    pub history: Vec<HistoryEntry>,
    pub variant_ids: Vec<Uuid>,
}

impl Snapshot {
    pub fn has_variants(&self) -> bool {
        !self.variant_ids.is_empty()
    }

    /// Original con variantes, o variante de otra pregunta.
    pub fn has_variant_lineage(&self) -> bool {
        self.question.is_variant || self.has_variants()
    }
}

/// Escritura pendiente: `expected = None` significa alta de pregunta nueva.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub expected: Option<Observed>,
    pub question: Question,
    pub entry: NewHistoryEntry,
}

pub trait QuestionStore {
    /// Carga una pregunta; `NotFound` si no existe.
    fn load(&self, id: Uuid) -> Result<Question, WorkflowError>;
    /// Variantes cuyo `original_question_id` es `original_id`, por número.
    fn variants_of(&self, original_id: Uuid) -> Result<Vec<Question>, WorkflowError>;
    /// Historial de la pregunta en orden de `seq`.
    fn history(&self, id: Uuid) -> Result<Vec<HistoryEntry>, WorkflowError>;
    /// Aplica el lote atómicamente y devuelve las entradas registradas en el
    /// mismo orden.
    fn apply_writes(&mut self, writes: Vec<PendingWrite>) -> Result<Vec<HistoryEntry>, WorkflowError>;

    fn snapshot(&self, id: Uuid) -> Result<Snapshot, WorkflowError> {
        let question = self.load(id)?;
        let history = self.history(id)?;
        let variant_ids = if question.is_variant {
            Vec::new()
        } else {
            self.variants_of(id)?.into_iter().map(|v| v.id).collect()
        };
        Ok(Snapshot { question,
                      history,
                      variant_ids })
    }

    fn insert(&mut self, question: Question, entry: NewHistoryEntry) -> Result<HistoryEntry, WorkflowError> {
        self.apply_writes(vec![PendingWrite { expected: None,
                                              question,
                                              entry }])?
            .pop()
            .ok_or_else(|| WorkflowError::Internal("el store no devolvió la entrada registrada".into()))
    }

    fn commit(&mut self,
              expected: Observed,
              question: Question,
              entry: NewHistoryEntry)
              -> Result<HistoryEntry, WorkflowError> {
        self.apply_writes(vec![PendingWrite { expected: Some(expected),
                                              question,
                                              entry }])?
            .pop()
            .ok_or_else(|| WorkflowError::Internal("el store no devolvió la entrada registrada".into()))
    }
}
