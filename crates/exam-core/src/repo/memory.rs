use indexmap::IndexMap;
use uuid::Uuid;

use super::{PendingWrite, QuestionStore};
use crate::errors::WorkflowError;
use crate::history::{HistoryEntry, HistoryLog, InMemoryHistoryLog};
use exam_domain::Question;

/// Store en memoria; conserva el orden de alta de las preguntas.
#[derive(Debug, Default)]
pub struct InMemoryQuestionStore<H: HistoryLog = InMemoryHistoryLog> {
    questions: IndexMap<Uuid, Question>,
    log: H,
}

impl InMemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: HistoryLog> InMemoryQuestionStore<H> {
    pub fn with_log(log: H) -> Self {
        Self { questions: IndexMap::new(),
               log }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }

    fn check(&self, write: &PendingWrite) -> Result<(), WorkflowError> {
        let id = write.question.id;
        match (write.expected, self.questions.get(&id)) {
            (None, None) => Ok(()),
            (None, Some(_)) => Err(WorkflowError::Validation(format!("la pregunta {id} ya existe"))),
            (Some(_), None) => Err(WorkflowError::NotFound(format!("question {id}"))),
            (Some(expected), Some(stored)) if expected.matches(stored) => Ok(()),
            (Some(_), Some(_)) => Err(WorkflowError::Conflict(id)),
        }
    }
}

impl<H: HistoryLog> QuestionStore for InMemoryQuestionStore<H> {
    fn load(&self, id: Uuid) -> Result<Question, WorkflowError> {
        self.questions
            .get(&id)
            .cloned()
            .ok_or_else(|| WorkflowError::NotFound(format!("question {id}")))
    }

    fn variants_of(&self, original_id: Uuid) -> Result<Vec<Question>, WorkflowError> {
        let mut variants: Vec<Question> = self.questions
                                              .values()
                                              .filter(|q| q.is_variant && q.original_question_id == Some(original_id))
                                              .cloned()
                                              .collect();
        variants.sort_by_key(|q| q.variant_number);
        Ok(variants)
    }

    fn history(&self, id: Uuid) -> Result<Vec<HistoryEntry>, WorkflowError> {
        Ok(self.log.list(id))
    }

    fn apply_writes(&mut self, writes: Vec<PendingWrite>) -> Result<Vec<HistoryEntry>, WorkflowError> {
        // todo o nada: se valida el lote completo antes de escribir
        for w in &writes {
            self.check(w)?;
        }
        let mut entries = Vec::with_capacity(writes.len());
        for w in writes {
            let id = w.question.id;
            self.questions.insert(id, w.question);
            entries.push(self.log.append(id, w.entry));
        }
        Ok(entries)
    }
}
