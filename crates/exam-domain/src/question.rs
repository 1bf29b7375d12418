// question.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::DomainError;

/// Posición de la pregunta dentro del pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    PendingCreator,
    PendingExplainer,
    PendingProcessor,
    Completed,
}

impl QuestionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionStatus::PendingCreator => "pending_creator",
            QuestionStatus::PendingExplainer => "pending_explainer",
            QuestionStatus::PendingProcessor => "pending_processor",
            QuestionStatus::Completed => "completed",
        }
    }
}

impl FromStr for QuestionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_creator" => Ok(QuestionStatus::PendingCreator),
            "pending_explainer" => Ok(QuestionStatus::PendingExplainer),
            "pending_processor" => Ok(QuestionStatus::PendingProcessor),
            "completed" => Ok(QuestionStatus::Completed),
            other => Err(DomainError::ValidationError(format!("status desconocido: {other}"))),
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "MCQ")]
    Mcq,
    #[serde(rename = "TRUE_FALSE")]
    TrueFalse,
}

/// Rol que levantó el flag (o `None` si no hay flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    None,
    Creator,
    Explainer,
    Student,
}

impl FlagType {
    pub fn as_str(self) -> &'static str {
        match self {
            FlagType::None => "none",
            FlagType::Creator => "creator",
            FlagType::Explainer => "explainer",
            FlagType::Student => "student",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagStatus {
    None,
    Pending,
    Approved,
    Rejected,
}

impl FlagStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FlagStatus::None => "none",
            FlagStatus::Pending => "pending",
            FlagStatus::Approved => "approved",
            FlagStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for FlagStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(FlagStatus::None),
            "pending" => Ok(FlagStatus::Pending),
            "approved" => Ok(FlagStatus::Approved),
            "rejected" => Ok(FlagStatus::Rejected),
            other => Err(DomainError::ValidationError(format!("flag status desconocido: {other}"))),
        }
    }
}

impl fmt::Display for FlagStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pregunta de examen junto con su estado de workflow y de flag.
///
/// Los campos son públicos porque el motor de workflow produce versiones
/// nuevas de la pregunta en cada transición; las reglas de contenido se
/// verifican con `validate_content` y las de linaje con `new_variant`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub subject_id: Option<Uuid>,
    pub topic_id: Option<Uuid>,
    pub status: QuestionStatus,
    pub is_variant: bool,
    pub original_question_id: Option<Uuid>,
    pub variant_number: Option<u32>,
    pub assigned_creator_id: Option<Uuid>,
    pub assigned_explainer_id: Option<Uuid>,
    pub approved_by_id: Option<Uuid>,
    pub last_modified_by_id: Option<Uuid>,
    pub created_by: Uuid,
    pub notes: Option<String>,
    pub is_flagged: bool,
    pub flag_type: FlagType,
    pub flag_reason: Option<String>,
    pub flag_status: FlagStatus,
    pub flag_rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contenido de una variante a generar a partir de una pregunta original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDraft {
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// Edición parcial de contenido. Los campos `None` no se tocan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionEdit {
    pub question_text: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub notes: Option<String>,
}

impl QuestionEdit {
    pub fn is_empty(&self) -> bool {
        self.question_text.is_none()
        && self.options.is_none()
        && self.correct_answer.is_none()
        && self.explanation.is_none()
        && self.notes.is_none()
    }
}

impl Question {
    /// Crea una pregunta original (no variante) en `pending_creator`.
    ///
    /// # Errores
    /// Retorna `DomainError::ValidationError` si el texto está vacío o si las
    /// opciones no son coherentes con `question_type` / `correct_answer`.
    pub fn new(question_text: impl Into<String>,
               question_type: QuestionType,
               options: Vec<String>,
               correct_answer: impl Into<String>,
               created_by: Uuid)
               -> Result<Self, DomainError> {
        let now = Utc::now();
        let options = match (question_type, options.is_empty()) {
            (QuestionType::TrueFalse, true) => vec!["True".to_string(), "False".to_string()],
            _ => options,
        };
        let question = Question { id: Uuid::new_v4(),
                                  question_text: question_text.into(),
                                  question_type,
                                  options,
                                  correct_answer: correct_answer.into(),
                                  explanation: None,
                                  subject_id: None,
                                  topic_id: None,
                                  status: QuestionStatus::PendingCreator,
                                  is_variant: false,
                                  original_question_id: None,
                                  variant_number: None,
                                  assigned_creator_id: None,
                                  assigned_explainer_id: None,
                                  approved_by_id: None,
                                  last_modified_by_id: None,
                                  created_by,
                                  notes: None,
                                  is_flagged: false,
                                  flag_type: FlagType::None,
                                  flag_reason: None,
                                  flag_status: FlagStatus::None,
                                  flag_rejection_reason: None,
                                  created_at: now,
                                  updated_at: now };
        question.validate_content()?;
        Ok(question)
    }

    pub fn with_subject(mut self, subject_id: Uuid, topic_id: Option<Uuid>) -> Self {
        self.subject_id = Some(subject_id);
        self.topic_id = topic_id;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Deriva una variante de `original`, heredando asignatura y tema.
    ///
    /// # Errores
    /// `ValidationError` si `original` es a su vez una variante o si el
    /// contenido del borrador no es válido.
    pub fn new_variant(original: &Question,
                       variant_number: u32,
                       draft: VariantDraft,
                       created_by: Uuid)
                       -> Result<Self, DomainError> {
        if original.is_variant {
            return Err(DomainError::ValidationError(format!("la pregunta {} ya es una variante", original.id)));
        }
        let mut variant = Question::new(draft.question_text,
                                        original.question_type,
                                        draft.options,
                                        draft.correct_answer,
                                        created_by)?;
        variant.is_variant = true;
        variant.original_question_id = Some(original.id);
        variant.variant_number = Some(variant_number);
        variant.subject_id = original.subject_id;
        variant.topic_id = original.topic_id;
        variant.assigned_creator_id = Some(created_by);
        Ok(variant)
    }

    /// Verifica las reglas de contenido según el tipo de pregunta.
    pub fn validate_content(&self) -> Result<(), DomainError> {
        if self.question_text.trim().is_empty() {
            return Err(DomainError::ValidationError("el enunciado no puede estar vacío".to_string()));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err(DomainError::ValidationError("las opciones no pueden estar vacías".to_string()));
        }
        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.trim().to_lowercase()) {
                return Err(DomainError::ValidationError(format!("opción duplicada: {option}")));
            }
        }
        match self.question_type {
            QuestionType::Mcq if self.options.len() < 2 => {
                return Err(DomainError::ValidationError("una pregunta MCQ requiere al menos 2 opciones".to_string()));
            }
            QuestionType::TrueFalse if self.options.len() != 2 => {
                return Err(DomainError::ValidationError("una pregunta TRUE_FALSE tiene exactamente 2 opciones".to_string()));
            }
            _ => {}
        }
        let answer = self.correct_answer.trim().to_lowercase();
        if !self.options.iter().any(|o| o.trim().to_lowercase() == answer) {
            return Err(DomainError::ValidationError(format!("la respuesta correcta '{}' no está entre las opciones",
                                                            self.correct_answer)));
        }
        if self.is_variant && self.original_question_id.is_none() {
            return Err(DomainError::ValidationError("una variante requiere original_question_id".to_string()));
        }
        Ok(())
    }

    /// Aplica una edición parcial y revalida el contenido resultante.
    pub fn apply_edit(&mut self, edit: &QuestionEdit) -> Result<(), DomainError> {
        if let Some(text) = &edit.question_text {
            self.question_text = text.clone();
        }
        if let Some(options) = &edit.options {
            self.options = options.clone();
        }
        if let Some(answer) = &edit.correct_answer {
            self.correct_answer = answer.clone();
        }
        if let Some(explanation) = &edit.explanation {
            self.explanation = Some(explanation.clone()).filter(|e| !e.trim().is_empty());
        }
        if let Some(notes) = &edit.notes {
            self.notes = Some(notes.clone());
        }
        self.validate_content()
    }

    pub fn has_explanation(&self) -> bool {
        self.explanation.as_deref().is_some_and(|e| !e.trim().is_empty())
    }

    /// Limpia el flag por completo; tipo y motivo quedan sólo en el historial.
    pub fn clear_flag(&mut self) {
        self.is_flagged = false;
        self.flag_type = FlagType::None;
        self.flag_reason = None;
        self.flag_status = FlagStatus::None;
        self.flag_rejection_reason = None;
    }

    /// `flag_status != none` implica `is_flagged`.
    pub fn flag_invariant_holds(&self) -> bool {
        self.flag_status == FlagStatus::None || self.is_flagged
    }

    /// Marca la pregunta como modificada por `actor_id`.
    pub fn touch(&mut self, actor_id: Uuid) {
        self.last_modified_by_id = Some(actor_id);
        self.updated_at = Utc::now();
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.question_text.chars().take(60).collect();
        write!(f, "<question {} [{}] {}>", self.id, self.status, preview)
    }
}
