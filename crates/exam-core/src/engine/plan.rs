//! Planificación pura de transiciones.
//!
//! `plan` decide, sin tocar el store, si una acción es legal sobre el
//! snapshot y produce la nueva versión de la pregunta junto con la entrada de
//! historial a registrar. El motor sólo valida la asignación (si la hay) y
//! confirma.
use exam_domain::{FlagStatus, Question, QuestionStatus, Role};
use exam_policies::WorkflowPolicy;
use uuid::Uuid;

use super::{Action, Actor};
use crate::errors::WorkflowError;
use crate::flag;
use crate::history::{self, HistoryAction, HistoryEntry, NewHistoryEntry};
use crate::repo::Snapshot;
use crate::routing::{self, Destination};

/// Usuario a asignar antes del commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub user_id: Uuid,
    pub role: Role,
}

/// Transición planificada y aún no confirmada.
#[derive(Debug, Clone)]
pub struct Transition {
    pub question: Question,
    pub entry: NewHistoryEntry,
    pub next_destination: Destination,
    pub assignment: Option<AssignmentRequest>,
}

impl Transition {
    pub fn new(question: Question, entry: NewHistoryEntry, next_destination: Destination) -> Self {
        Self { question,
               entry,
               next_destination,
               assignment: None }
    }
}

pub(crate) fn require_role(actor: &Actor, allowed: &[Role]) -> Result<(), WorkflowError> {
    if allowed.contains(&actor.role) {
        return Ok(());
    }
    let expected = allowed.iter().map(|r| r.as_str()).collect::<Vec<_>>().join("|");
    Err(WorkflowError::RoleMismatch { expected,
                                      actual: actor.role.as_str().to_string() })
}

pub(crate) fn required_text(value: &str, what: &str) -> Result<String, WorkflowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WorkflowError::Validation(format!("{what} no puede estar vacío")));
    }
    Ok(trimmed.to_string())
}

pub fn plan(snap: &Snapshot,
            actor: &Actor,
            action: &Action,
            policy: &WorkflowPolicy)
            -> Result<Transition, WorkflowError> {
    match action {
        Action::Approve { assigned_user_id } => plan_approve(snap, actor, *assigned_user_id, policy),
        Action::Reject { reason } => plan_reject(snap, actor, reason),
        Action::SubmitExplanation { text } => plan_submit_explanation(snap, actor, text),
        Action::RaiseFlag { reason } => flag::raise(snap, actor, reason, &policy.reflag),
        Action::ApproveFlagReason => flag::approve_reason(snap, actor),
        Action::RejectFlagReason { reason } => flag::reject_reason(snap, actor, reason),
        Action::GathererRejectFlag { reason } => flag::gatherer_reject(snap, actor, reason),
        Action::AcceptGathererRejection => flag::accept_gatherer_rejection(snap, actor),
        Action::RejectGathererRejection { reason } => flag::reject_gatherer_rejection(snap, actor, reason),
        Action::ResubmitCorrection => flag::resubmit_correction(snap, actor),
        Action::Update { edit } => plan_update(snap, actor, edit),
        Action::Assign { user_id, role } => plan_assign(snap, actor, *user_id, *role),
    }
}

/// Un flag pendiente, aprobado sin corregir o rechazado por el gatherer
/// detiene el avance normal del pipeline.
fn ensure_flag_not_blocking(snap: &Snapshot) -> Result<(), WorkflowError> {
    let q = &snap.question;
    if flag::is_gatherer_rejected(snap) {
        return Err(WorkflowError::InvalidTransition(format!("la pregunta {} tiene un rechazo de flag del gatherer sin resolver",
                                                            q.id)));
    }
    if q.is_flagged && matches!(q.flag_status, FlagStatus::Pending | FlagStatus::Approved) {
        return Err(WorkflowError::InvalidTransition(format!("la pregunta {} tiene un flag {}", q.id, q.flag_status)));
    }
    Ok(())
}

fn plan_approve(snap: &Snapshot,
                actor: &Actor,
                assigned_user_id: Option<Uuid>,
                policy: &WorkflowPolicy)
                -> Result<Transition, WorkflowError> {
    let q = &snap.question;
    match q.status {
        QuestionStatus::PendingCreator => require_role(actor, &[Role::Creator, Role::Admin])?,
        QuestionStatus::PendingProcessor => require_role(actor, &[Role::Processor, Role::Admin])?,
        QuestionStatus::PendingExplainer => {
            require_role(actor, &[Role::Processor, Role::Admin])?;
            if !q.has_explanation() {
                return Err(WorkflowError::InvalidTransition(format!("la pregunta {} aún no tiene explicación",
                                                                    q.id)));
            }
        }
        QuestionStatus::Completed => {
            return Err(WorkflowError::InvalidTransition(format!("la pregunta {} ya está completada", q.id)));
        }
    }
    ensure_flag_not_blocking(snap)?;

    let entry = NewHistoryEntry::new(actor.role, HistoryAction::Approved, actor.id);
    let mut prospective = snap.clone();
    prospective.history
               .push(HistoryEntry::prospective(q.id, snap.history.len() as u64, &entry));
    let mut dest = routing::next_destination(&prospective);
    if q.status == QuestionStatus::PendingCreator && dest == Destination::Creator {
        // aprobar en la etapa creator nunca la deja en la misma cola
        dest = Destination::Explainer;
    }

    let assignment = match (assigned_user_id, dest.role()) {
        (Some(user_id), Some(role @ (Role::Creator | Role::Explainer))) => Some(AssignmentRequest { user_id, role }),
        (Some(_), _) => {
            return Err(WorkflowError::Validation(format!("no hay a quién asignar en destino {dest}")));
        }
        (None, Some(role @ (Role::Creator | Role::Explainer)))
            if policy.assignment.assignment_mandatory(q, role)
               && crate::assignment::requires_assignment(q, dest) =>
        {
            return Err(WorkflowError::Validation(format!("la pregunta {} requiere asignar un {role}", q.id)));
        }
        (None, _) => None,
    };

    let mut next = q.clone();
    if next.flag_status == FlagStatus::Rejected {
        next.clear_flag();
    }
    next.status = dest.status_from(q.status);
    next.approved_by_id = Some(actor.id);
    next.touch(actor.id);
    Ok(Transition { question: next,
                    entry,
                    next_destination: dest,
                    assignment })
}

fn plan_reject(snap: &Snapshot, actor: &Actor, reason: &str) -> Result<Transition, WorkflowError> {
    require_role(actor, &[Role::Processor, Role::Admin])?;
    let reason = required_text(reason, "el motivo de rechazo")?;
    let q = &snap.question;
    if q.status != QuestionStatus::PendingProcessor {
        return Err(WorkflowError::InvalidTransition(format!("sólo se rechaza desde pending_processor (actual: {})",
                                                            q.status)));
    }
    ensure_flag_not_blocking(snap)?;

    let dest = match history::origin_role(&snap.history) {
        Some(Role::Explainer) => Destination::Explainer,
        _ => Destination::Creator,
    };
    let mut next = q.clone();
    next.status = dest.status_from(q.status);
    next.touch(actor.id);
    Ok(Transition::new(next,
                       NewHistoryEntry::new(actor.role, HistoryAction::Rejected, actor.id).with_note(reason),
                       dest))
}

fn plan_submit_explanation(snap: &Snapshot, actor: &Actor, text: &str) -> Result<Transition, WorkflowError> {
    require_role(actor, &[Role::Explainer, Role::Admin])?;
    let text = required_text(text, "la explicación")?;
    let q = &snap.question;
    if q.status != QuestionStatus::PendingExplainer {
        return Err(WorkflowError::InvalidTransition(format!("la pregunta {} no espera explicación (actual: {})",
                                                            q.id, q.status)));
    }

    let mut next = q.clone();
    if q.is_flagged {
        match q.flag_status {
            FlagStatus::Pending => {
                return Err(WorkflowError::InvalidTransition(format!("la pregunta {} tiene un flag pendiente", q.id)));
            }
            FlagStatus::Approved if flag::correction_role(snap) != Some(Role::Explainer) => {
                return Err(WorkflowError::InvalidTransition(format!("la corrección de la pregunta {} no corresponde al explainer",
                                                                    q.id)));
            }
            // la nueva explicación es la corrección
            FlagStatus::Approved | FlagStatus::Rejected | FlagStatus::None => next.clear_flag(),
        }
    }
    next.explanation = Some(text);
    next.status = QuestionStatus::PendingProcessor;
    next.touch(actor.id);
    Ok(Transition::new(next,
                       NewHistoryEntry::new(actor.role, HistoryAction::ExplanationSubmitted, actor.id),
                       Destination::Processor))
}

fn plan_update(snap: &Snapshot,
               actor: &Actor,
               edit: &exam_domain::QuestionEdit)
               -> Result<Transition, WorkflowError> {
    require_role(actor, &[Role::Gatherer, Role::Creator, Role::Explainer, Role::Admin])?;
    if edit.is_empty() {
        return Err(WorkflowError::Validation("la edición no cambia ningún campo".into()));
    }
    let q = &snap.question;
    if (q.is_flagged && q.flag_status == FlagStatus::Pending) || flag::is_gatherer_rejected(snap) {
        return Err(WorkflowError::InvalidTransition(format!("la pregunta {} espera una decisión sobre su flag",
                                                            q.id)));
    }
    let correction = if q.is_flagged && q.flag_status == FlagStatus::Approved {
        flag::correction_role(snap)
    } else {
        None
    };
    if q.status == QuestionStatus::Completed && correction.is_none() {
        return Err(WorkflowError::InvalidTransition(format!("la pregunta {} está completada", q.id)));
    }
    let allowed = match actor.role {
        Role::Admin => true,
        Role::Gatherer => {
            actor.id == q.created_by
            && (q.status == QuestionStatus::PendingCreator || correction == Some(Role::Gatherer))
        }
        Role::Creator => q.status == QuestionStatus::PendingCreator || correction == Some(Role::Creator),
        Role::Explainer => q.status == QuestionStatus::PendingExplainer || correction == Some(Role::Explainer),
        _ => false,
    };
    if !allowed {
        return Err(WorkflowError::InvalidTransition(format!("{} no puede editar la pregunta {} en {}",
                                                            actor.role, q.id, q.status)));
    }

    let mut next = q.clone();
    next.apply_edit(edit)?;
    next.touch(actor.id);
    Ok(Transition::new(next,
                       NewHistoryEntry::new(actor.role, HistoryAction::Updated, actor.id),
                       routing::current_queue(snap)))
}

fn plan_assign(snap: &Snapshot, actor: &Actor, user_id: Uuid, role: Role) -> Result<Transition, WorkflowError> {
    require_role(actor, &[Role::Processor, Role::Admin, Role::Creator])?;
    if !matches!(role, Role::Creator | Role::Explainer) {
        return Err(WorkflowError::Validation(format!("no se asignan preguntas al rol {role}")));
    }
    if actor.role == Role::Creator && role != Role::Explainer {
        return Err(WorkflowError::RoleMismatch { expected: "processor|admin".into(),
                                                 actual: actor.role.as_str().to_string() });
    }
    let q = &snap.question;
    if q.status == QuestionStatus::Completed {
        return Err(WorkflowError::InvalidTransition(format!("la pregunta {} está completada", q.id)));
    }
    let mut next = q.clone();
    next.touch(actor.id);
    let entry = NewHistoryEntry::new(actor.role, HistoryAction::Assigned, actor.id).with_note(format!("{role} {user_id}"));
    Ok(Transition { question: next,
                    entry,
                    next_destination: routing::current_queue(snap),
                    assignment: Some(AssignmentRequest { user_id, role }) })
}
