//! Tipos de entrada del historial.
//!
//! Rol en el flujo:
//! - Cada comando exitoso del `WorkflowEngine` agrega exactamente una entrada
//!   por pregunta afectada.
//! - Las entradas nunca se editan ni se reordenan; las decisiones del motor
//!   (routing, flags) se toman escaneando el historial desde el final.
use chrono::{DateTime, Utc};
use exam_domain::{DomainError, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Updated,
    Approved,
    Rejected,
    VariantCreated,
    ExplanationSubmitted,
    Assigned,
    FlagRaised,
    FlagApproved,
    FlagRejected,
    FlagRejectedByGatherer,
    GathererRejectionAccepted,
    GathererRejectionRejected,
    CorrectionResubmitted,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryAction::Created => "created",
            HistoryAction::Updated => "updated",
            HistoryAction::Approved => "approved",
            HistoryAction::Rejected => "rejected",
            HistoryAction::VariantCreated => "variant_created",
            HistoryAction::ExplanationSubmitted => "explanation_submitted",
            HistoryAction::Assigned => "assigned",
            HistoryAction::FlagRaised => "flag_raised",
            HistoryAction::FlagApproved => "flag_approved",
            HistoryAction::FlagRejected => "flag_rejected",
            HistoryAction::FlagRejectedByGatherer => "flag_rejected_by_gatherer",
            HistoryAction::GathererRejectionAccepted => "gatherer_rejection_accepted",
            HistoryAction::GathererRejectionRejected => "gatherer_rejection_rejected",
            HistoryAction::CorrectionResubmitted => "correction_resubmitted",
        }
    }
}

impl FromStr for HistoryAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| DomainError::ValidationError(format!("acción de historial desconocida: {s}")))
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entrada aún no registrada: la produce el motor y la completa el log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub role: Role,
    pub action: HistoryAction,
    pub actor_id: Uuid,
    pub note: Option<String>,
}

impl NewHistoryEntry {
    pub fn new(role: Role, action: HistoryAction, actor_id: Uuid) -> Self {
        Self { role,
               action,
               actor_id,
               note: None }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub seq: u64, // asignado por el log (orden append)
    pub question_id: Uuid,
    pub role: Role,
    pub action: HistoryAction,
    pub actor_id: Uuid,
    pub ts: DateTime<Utc>,
    pub note: Option<String>,
}

impl HistoryEntry {
    /// Vista previa de cómo quedaría `entry` al registrarse; sólo se usa para
    /// evaluar el routing antes del commit.
    pub fn prospective(question_id: Uuid, seq: u64, entry: &NewHistoryEntry) -> Self {
        Self { seq,
               question_id,
               role: entry.role,
               action: entry.action,
               actor_id: entry.actor_id,
               ts: Utc::now(),
               note: entry.note.clone() }
    }
}
