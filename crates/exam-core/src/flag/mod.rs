//! Sub-workflow de flags.
//!
//! Máquina de estados del flag:
//! `none -> pending` (raise) `-> approved | rejected` (processor/admin) `->
//! none` cuando el rol que debe corregir reenvía la pregunta. El tipo y el
//! motivo del flag sólo sobreviven en el historial.
//!
//! Precedencia: mientras un rechazo del gatherer está sin resolver, el
//! processor sólo puede aceptarlo o rechazarlo y no se admiten flags nuevos.
use exam_domain::{FlagStatus, FlagType, QuestionStatus, Role};
use exam_policies::{FlagContext, FlagPolicy, PolicyVerdict, ReflagPolicy};
use log::debug;

use crate::engine::plan::{require_role, required_text};
use crate::engine::{Actor, Transition};
use crate::errors::WorkflowError;
use crate::history::{self, HistoryAction, NewHistoryEntry};
use crate::repo::Snapshot;
use crate::routing::{self, Destination};

/// Rol que debe corregir la pregunta mientras el flag está abierto.
///
/// Un flag de student va al creator si la pregunta tiene linaje de variantes
/// y al gatherer si es un original suelto. Si el processor rechazó el
/// rechazo del gatherer, la corrección queda en manos del gatherer.
pub fn correction_role(snap: &Snapshot) -> Option<Role> {
    let q = &snap.question;
    if !q.is_flagged {
        return None;
    }
    if history::flag_routed_to_gatherer(&snap.history) {
        return Some(Role::Gatherer);
    }
    match q.flag_type {
        FlagType::Student if snap.has_variant_lineage() => Some(Role::Creator),
        FlagType::Student => Some(Role::Gatherer),
        FlagType::Creator => Some(Role::Creator),
        FlagType::Explainer => Some(Role::Explainer),
        FlagType::None => None,
    }
}

/// Estado "flag rechazado por el gatherer" a la espera del processor.
pub fn is_gatherer_rejected(snap: &Snapshot) -> bool {
    let q = &snap.question;
    q.flag_rejection_reason.as_deref().is_some_and(|r| !r.trim().is_empty())
    && q.status == QuestionStatus::PendingProcessor
    && history::gatherer_rejection_recorded(&snap.history)
}

/// El rol corrector (o un admin) editó la pregunta después del último flag,
/// que sigue abierto. Es la condición que exige `resubmit_correction`.
pub fn corrected_after_flag(snap: &Snapshot) -> bool {
    let q = &snap.question;
    if !q.is_flagged || !matches!(q.flag_status, FlagStatus::Pending | FlagStatus::Approved) {
        return false;
    }
    correction_role(snap).is_some_and(|role| history::updated_after_flag_by(&snap.history, &[role, Role::Admin]))
}

fn flag_type_for(role: Role) -> Option<FlagType> {
    match role {
        Role::Creator => Some(FlagType::Creator),
        Role::Explainer => Some(FlagType::Explainer),
        Role::Student => Some(FlagType::Student),
        _ => None,
    }
}

/// Comprobación común de approve/reject del motivo de un flag.
fn ensure_resolvable(snap: &Snapshot) -> Result<(), WorkflowError> {
    let q = &snap.question;
    if is_gatherer_rejected(snap) {
        return Err(WorkflowError::InvalidTransition(format!("el flag de {} fue rechazado por el gatherer; resuélvalo con accept/reject",
                                                            q.id)));
    }
    if !q.is_flagged {
        return Err(WorkflowError::InvalidState(format!("la pregunta {} no tiene flag", q.id)));
    }
    if q.flag_status != FlagStatus::Pending {
        return Err(WorkflowError::InvalidState(format!("el flag de {} no está pendiente ({})", q.id, q.flag_status)));
    }
    Ok(())
}

pub fn raise(snap: &Snapshot,
             actor: &Actor,
             reason: &str,
             policy: &ReflagPolicy)
             -> Result<Transition, WorkflowError> {
    require_role(actor, &[Role::Creator, Role::Explainer, Role::Student])?;
    let reason = required_text(reason, "el motivo del flag")?;
    let q = &snap.question;
    if q.is_flagged && q.flag_status == FlagStatus::Pending {
        return Err(WorkflowError::InvalidState(format!("la pregunta {} ya tiene un flag pendiente", q.id)));
    }
    if is_gatherer_rejected(snap) {
        return Err(WorkflowError::InvalidState(format!("la pregunta {} tiene un rechazo del gatherer sin resolver",
                                                       q.id)));
    }
    if q.is_flagged && q.flag_status == FlagStatus::Approved {
        return Err(WorkflowError::InvalidState(format!("la pregunta {} espera la corrección de un flag aprobado",
                                                       q.id)));
    }
    match (actor.role, q.status) {
        (Role::Student, QuestionStatus::Completed) => {}
        (Role::Student, status) => {
            return Err(WorkflowError::InvalidTransition(format!("un student sólo marca preguntas publicadas (actual: {status})")));
        }
        (_, QuestionStatus::Completed) => {
            return Err(WorkflowError::InvalidTransition(format!("la pregunta {} ya está completada", q.id)));
        }
        _ => {}
    }
    let ctx = FlagContext { question: q,
                            previously_flagged: history::previously_flagged(&snap.history) };
    if let PolicyVerdict::Deny(why) = policy.check(&ctx) {
        debug!("policy {} niega flag sobre {}: {}", policy.id(), q.id, why);
        return Err(WorkflowError::InvalidTransition(why));
    }
    let flag_type = flag_type_for(actor.role).ok_or_else(|| WorkflowError::Internal("rol sin tipo de flag".into()))?;

    let mut next = q.clone();
    next.is_flagged = true;
    next.flag_status = FlagStatus::Pending;
    next.flag_type = flag_type;
    next.flag_reason = Some(reason.clone());
    next.flag_rejection_reason = None;
    next.touch(actor.id);
    Ok(Transition::new(next,
                       NewHistoryEntry::new(actor.role, HistoryAction::FlagRaised, actor.id).with_note(reason),
                       Destination::Processor))
}

pub fn approve_reason(snap: &Snapshot, actor: &Actor) -> Result<Transition, WorkflowError> {
    require_role(actor, &[Role::Processor, Role::Admin])?;
    ensure_resolvable(snap)?;
    let q = &snap.question;
    let dest = match q.flag_type {
        FlagType::Student if snap.has_variant_lineage() => Destination::Creator,
        FlagType::Student => Destination::Gatherer,
        FlagType::Creator => Destination::Creator,
        FlagType::Explainer => Destination::Explainer,
        FlagType::None => {
            return Err(WorkflowError::InvalidState(format!("el flag de {} no tiene tipo", q.id)));
        }
    };
    let mut next = q.clone();
    next.flag_status = FlagStatus::Approved;
    next.status = dest.status_from(q.status);
    next.touch(actor.id);
    Ok(Transition::new(next,
                       NewHistoryEntry::new(actor.role, HistoryAction::FlagApproved, actor.id),
                       dest))
}

pub fn reject_reason(snap: &Snapshot, actor: &Actor, reason: &str) -> Result<Transition, WorkflowError> {
    require_role(actor, &[Role::Processor, Role::Admin])?;
    let reason = required_text(reason, "el motivo de rechazo del flag")?;
    ensure_resolvable(snap)?;
    let q = &snap.question;
    let dest = match q.flag_type {
        FlagType::Student => Destination::Completed,
        FlagType::Creator => Destination::Creator,
        FlagType::Explainer => Destination::Explainer,
        FlagType::None => {
            return Err(WorkflowError::InvalidState(format!("el flag de {} no tiene tipo", q.id)));
        }
    };
    let mut next = q.clone();
    next.flag_status = FlagStatus::Rejected;
    next.flag_rejection_reason = Some(reason.clone());
    next.status = dest.status_from(q.status);
    next.touch(actor.id);
    Ok(Transition::new(next,
                       NewHistoryEntry::new(actor.role, HistoryAction::FlagRejected, actor.id).with_note(reason),
                       dest))
}

/// El gatherer autor (o un admin) objeta un flag abierto; la pregunta pasa a
/// la cola del processor.
pub fn gatherer_reject(snap: &Snapshot, actor: &Actor, reason: &str) -> Result<Transition, WorkflowError> {
    require_role(actor, &[Role::Gatherer, Role::Admin])?;
    let q = &snap.question;
    if actor.role == Role::Gatherer && actor.id != q.created_by {
        return Err(WorkflowError::RoleMismatch { expected: "gatherer autor|admin".into(),
                                                 actual: actor.role.as_str().to_string() });
    }
    let reason = required_text(reason, "el motivo de rechazo del flag")?;
    if !q.is_flagged || !matches!(q.flag_status, FlagStatus::Pending | FlagStatus::Approved) {
        return Err(WorkflowError::InvalidState(format!("la pregunta {} no tiene un flag abierto", q.id)));
    }
    if is_gatherer_rejected(snap) {
        return Err(WorkflowError::InvalidState(format!("el flag de {} ya fue rechazado por el gatherer", q.id)));
    }
    let mut next = q.clone();
    next.flag_rejection_reason = Some(reason.clone());
    next.status = QuestionStatus::PendingProcessor;
    next.touch(actor.id);
    Ok(Transition::new(next,
                       NewHistoryEntry::new(actor.role, HistoryAction::FlagRejectedByGatherer, actor.id).with_note(reason),
                       Destination::Processor))
}

fn ensure_gatherer_rejected(snap: &Snapshot, actor: &Actor) -> Result<(), WorkflowError> {
    require_role(actor, &[Role::Processor, Role::Admin])?;
    if !is_gatherer_rejected(snap) {
        return Err(WorkflowError::InvalidState(format!("la pregunta {} no tiene un rechazo del gatherer pendiente",
                                                       snap.question.id)));
    }
    Ok(())
}

pub fn accept_gatherer_rejection(snap: &Snapshot, actor: &Actor) -> Result<Transition, WorkflowError> {
    ensure_gatherer_rejected(snap, actor)?;
    let mut next = snap.question.clone();
    next.clear_flag();
    next.status = QuestionStatus::Completed;
    next.touch(actor.id);
    Ok(Transition::new(next,
                       NewHistoryEntry::new(actor.role, HistoryAction::GathererRejectionAccepted, actor.id),
                       Destination::Completed))
}

/// Restaura el flag original como aprobado y lo devuelve al gatherer junto
/// con el motivo.
pub fn reject_gatherer_rejection(snap: &Snapshot, actor: &Actor, reason: &str) -> Result<Transition, WorkflowError> {
    ensure_gatherer_rejected(snap, actor)?;
    let reason = required_text(reason, "el motivo")?;
    let mut next = snap.question.clone();
    next.flag_status = FlagStatus::Approved;
    next.flag_rejection_reason = None;
    next.touch(actor.id);
    Ok(Transition::new(next,
                       NewHistoryEntry::new(actor.role, HistoryAction::GathererRejectionRejected, actor.id).with_note(reason),
                       Destination::Gatherer))
}

/// El rol corrector reenvía la pregunta tras editarla; el flag se cierra y la
/// pregunta sigue según `next_destination`.
pub fn resubmit_correction(snap: &Snapshot, actor: &Actor) -> Result<Transition, WorkflowError> {
    let q = &snap.question;
    if !q.is_flagged || q.flag_status != FlagStatus::Approved {
        return Err(WorkflowError::InvalidState(format!("la pregunta {} no tiene un flag aprobado", q.id)));
    }
    let correction = correction_role(snap).ok_or_else(|| {
                                              WorkflowError::InvalidState(format!("el flag de {} no tiene rol corrector",
                                                                                  q.id))
                                          })?;
    require_role(actor, &[correction, Role::Admin])?;
    if !corrected_after_flag(snap) {
        return Err(WorkflowError::InvalidTransition(format!("la pregunta {} no fue editada después del flag", q.id)));
    }
    let dest = routing::next_destination(snap);
    let mut next = q.clone();
    next.clear_flag();
    next.status = dest.status_from(q.status);
    next.touch(actor.id);
    Ok(Transition::new(next,
                       NewHistoryEntry::new(actor.role, HistoryAction::CorrectionResubmitted, actor.id),
                       dest))
}
