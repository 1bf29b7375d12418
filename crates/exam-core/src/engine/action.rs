//! Acciones que un actor puede pedir sobre una pregunta existente.
use exam_domain::{QuestionEdit, QuestionStatus, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::HistoryEntry;
use crate::routing::Destination;

/// Usuario autenticado que ejecuta el comando, con el rol con el que actúa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Approve { assigned_user_id: Option<Uuid> },
    Reject { reason: String },
    SubmitExplanation { text: String },
    RaiseFlag { reason: String },
    ApproveFlagReason,
    RejectFlagReason { reason: String },
    GathererRejectFlag { reason: String },
    AcceptGathererRejection,
    RejectGathererRejection { reason: String },
    ResubmitCorrection,
    Update { edit: QuestionEdit },
    Assign { user_id: Uuid, role: Role },
}

/// Discriminante de `Action` sin payload (lo que la UI ofrece como botón).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Approve,
    Reject,
    SubmitExplanation,
    RaiseFlag,
    ApproveFlagReason,
    RejectFlagReason,
    GathererRejectFlag,
    AcceptGathererRejection,
    RejectGathererRejection,
    ResubmitCorrection,
    Update,
    Assign,
}

impl ActionKind {
    pub const ALL: [ActionKind; 12] = [ActionKind::Approve,
                                       ActionKind::Reject,
                                       ActionKind::SubmitExplanation,
                                       ActionKind::RaiseFlag,
                                       ActionKind::ApproveFlagReason,
                                       ActionKind::RejectFlagReason,
                                       ActionKind::GathererRejectFlag,
                                       ActionKind::AcceptGathererRejection,
                                       ActionKind::RejectGathererRejection,
                                       ActionKind::ResubmitCorrection,
                                       ActionKind::Update,
                                       ActionKind::Assign];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Approve => "approve",
            ActionKind::Reject => "reject",
            ActionKind::SubmitExplanation => "submit_explanation",
            ActionKind::RaiseFlag => "raise_flag",
            ActionKind::ApproveFlagReason => "approve_flag_reason",
            ActionKind::RejectFlagReason => "reject_flag_reason",
            ActionKind::GathererRejectFlag => "gatherer_reject_flag",
            ActionKind::AcceptGathererRejection => "accept_gatherer_rejection",
            ActionKind::RejectGathererRejection => "reject_gatherer_rejection",
            ActionKind::ResubmitCorrection => "resubmit_correction",
            ActionKind::Update => "update",
            ActionKind::Assign => "assign",
        }
    }

    /// Acción con payload de muestra, usada para sondear legalidad.
    pub(crate) fn probe(self) -> Action {
        let text = || "-".to_string();
        match self {
            ActionKind::Approve => Action::Approve { assigned_user_id: None },
            ActionKind::Reject => Action::Reject { reason: text() },
            ActionKind::SubmitExplanation => Action::SubmitExplanation { text: text() },
            ActionKind::RaiseFlag => Action::RaiseFlag { reason: text() },
            ActionKind::ApproveFlagReason => Action::ApproveFlagReason,
            ActionKind::RejectFlagReason => Action::RejectFlagReason { reason: text() },
            ActionKind::GathererRejectFlag => Action::GathererRejectFlag { reason: text() },
            ActionKind::AcceptGathererRejection => Action::AcceptGathererRejection,
            ActionKind::RejectGathererRejection => Action::RejectGathererRejection { reason: text() },
            ActionKind::ResubmitCorrection => Action::ResubmitCorrection,
            ActionKind::Update => Action::Update { edit: QuestionEdit { notes: Some(text()),
                                                                        ..Default::default() } },
            ActionKind::Assign => Action::Assign { user_id: Uuid::nil(),
                                                   role: Role::Explainer },
        }
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Approve { .. } => ActionKind::Approve,
            Action::Reject { .. } => ActionKind::Reject,
            Action::SubmitExplanation { .. } => ActionKind::SubmitExplanation,
            Action::RaiseFlag { .. } => ActionKind::RaiseFlag,
            Action::ApproveFlagReason => ActionKind::ApproveFlagReason,
            Action::RejectFlagReason { .. } => ActionKind::RejectFlagReason,
            Action::GathererRejectFlag { .. } => ActionKind::GathererRejectFlag,
            Action::AcceptGathererRejection => ActionKind::AcceptGathererRejection,
            Action::RejectGathererRejection { .. } => ActionKind::RejectGathererRejection,
            Action::ResubmitCorrection => ActionKind::ResubmitCorrection,
            Action::Update { .. } => ActionKind::Update,
            Action::Assign { .. } => ActionKind::Assign,
        }
    }
}

/// Resultado de un comando confirmado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub question_id: Uuid,
    pub status: QuestionStatus,
    /// Cola en la que la pregunta queda esperando.
    pub next_destination: Destination,
    pub history_entry: HistoryEntry,
}
