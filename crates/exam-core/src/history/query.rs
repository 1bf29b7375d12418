//! Consultas sobre el historial de una pregunta.
//!
//! Todas escanean desde el final (la coincidencia más reciente gana) y son
//! funciones puras: mismo historial, misma respuesta.
use exam_domain::Role;

use super::{HistoryAction, HistoryEntry};

/// Entrada más reciente que cumple `pred`.
pub fn latest<F>(history: &[HistoryEntry], pred: F) -> Option<&HistoryEntry>
    where F: Fn(&HistoryEntry) -> bool
{
    history.iter().rev().find(|e| pred(*e))
}

/// Posición del último `flag_raised`, si existe.
pub fn last_flag_index(history: &[HistoryEntry]) -> Option<usize> {
    history.iter().rposition(|e| e.action == HistoryAction::FlagRaised)
}

/// Entradas posteriores al último `flag_raised` (vacío si nunca hubo flag).
pub fn since_last_flag(history: &[HistoryEntry]) -> &[HistoryEntry] {
    match last_flag_index(history) {
        Some(i) => &history[i + 1..],
        None => &[],
    }
}

pub fn previously_flagged(history: &[HistoryEntry]) -> bool {
    last_flag_index(history).is_some()
}

/// Hay un `updated` posterior al último flag hecho por alguno de `roles`.
pub fn updated_after_flag_by(history: &[HistoryEntry], roles: &[Role]) -> bool {
    since_last_flag(history).iter()
                            .any(|e| e.action == HistoryAction::Updated && roles.contains(&e.role))
}

/// El creator (o un admin actuando de creator al generar variantes) ya tocó
/// la pregunta.
pub fn creator_involved(history: &[HistoryEntry]) -> bool {
    history.iter().any(|e| match e.action {
                      HistoryAction::Approved => e.role == Role::Creator,
                      HistoryAction::VariantCreated => matches!(e.role, Role::Creator | Role::Admin),
                      _ => false,
                  })
}

/// El último movimiento sobre el flag en curso es un rechazo del gatherer que
/// el processor aún no resolvió.
pub fn gatherer_rejection_recorded(history: &[HistoryEntry]) -> bool {
    latest(history, |e| {
        matches!(e.action,
                 HistoryAction::FlagRaised
                 | HistoryAction::FlagRejectedByGatherer
                 | HistoryAction::GathererRejectionAccepted
                 | HistoryAction::GathererRejectionRejected)
    }).is_some_and(|e| {
          e.action == HistoryAction::FlagRejectedByGatherer && matches!(e.role, Role::Gatherer | Role::Admin)
      })
}

/// El processor devolvió el flag en curso al gatherer al rechazar su
/// objeción.
pub fn flag_routed_to_gatherer(history: &[HistoryEntry]) -> bool {
    latest(history, |e| {
        matches!(e.action,
                 HistoryAction::FlagRaised | HistoryAction::FlagApproved | HistoryAction::GathererRejectionRejected)
    }).is_some_and(|e| e.action == HistoryAction::GathererRejectionRejected)
}

/// Rol que entregó la pregunta por última vez dentro del pipeline (se usa
/// para devolverla al rechazarla).
pub fn origin_role(history: &[HistoryEntry]) -> Option<Role> {
    latest(history, |e| {
        matches!(e.action,
                 HistoryAction::Created
                 | HistoryAction::Approved
                 | HistoryAction::ExplanationSubmitted
                 | HistoryAction::CorrectionResubmitted)
        && matches!(e.role, Role::Gatherer | Role::Creator | Role::Explainer)
    }).map(|e| e.role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(seq: u64, role: Role, action: HistoryAction) -> HistoryEntry {
        HistoryEntry { seq,
                       question_id: Uuid::nil(),
                       role,
                       action,
                       actor_id: Uuid::nil(),
                       ts: Utc::now(),
                       note: None }
    }

    #[test]
    fn updates_before_the_flag_do_not_count() {
        let h = vec![entry(0, Role::Gatherer, HistoryAction::Created),
                     entry(1, Role::Creator, HistoryAction::Updated),
                     entry(2, Role::Explainer, HistoryAction::FlagRaised)];
        assert!(!updated_after_flag_by(&h, &[Role::Creator]));
        let mut h2 = h.clone();
        h2.push(entry(3, Role::Creator, HistoryAction::Updated));
        assert!(updated_after_flag_by(&h2, &[Role::Creator]));
        assert!(!updated_after_flag_by(&h2, &[Role::Explainer]));
    }

    #[test]
    fn creator_involvement_requires_creator_role() {
        let h = vec![entry(0, Role::Gatherer, HistoryAction::Created),
                     entry(1, Role::Processor, HistoryAction::Approved)];
        assert!(!creator_involved(&h));
        let h2 = vec![entry(0, Role::Creator, HistoryAction::Approved)];
        assert!(creator_involved(&h2));
    }

    #[test]
    fn gatherer_rejection_is_closed_by_processor_decision() {
        let mut h = vec![entry(0, Role::Creator, HistoryAction::FlagRaised),
                         entry(1, Role::Gatherer, HistoryAction::FlagRejectedByGatherer)];
        assert!(gatherer_rejection_recorded(&h));
        h.push(entry(2, Role::Processor, HistoryAction::GathererRejectionRejected));
        assert!(!gatherer_rejection_recorded(&h));
        assert!(flag_routed_to_gatherer(&h));
        h.push(entry(3, Role::Explainer, HistoryAction::FlagRaised));
        assert!(!flag_routed_to_gatherer(&h));
    }

    #[test]
    fn origin_role_skips_processor_entries() {
        let h = vec![entry(0, Role::Gatherer, HistoryAction::Created),
                     entry(1, Role::Creator, HistoryAction::Approved),
                     entry(2, Role::Explainer, HistoryAction::ExplanationSubmitted),
                     entry(3, Role::Processor, HistoryAction::Rejected)];
        assert_eq!(origin_role(&h), Some(Role::Explainer));
        assert_eq!(origin_role(&h[..2]), Some(Role::Creator));
        assert_eq!(origin_role(&[]), None);
    }
}
