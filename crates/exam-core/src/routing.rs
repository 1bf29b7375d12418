//! Routing: a qué cola va (o está) una pregunta.
//!
//! `next_destination` se evalúa siempre desde cero sobre el snapshot (pregunta
//! + historial + variantes); no se guarda en ningún lado.
use exam_domain::{FlagStatus, FlagType, QuestionStatus, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::flag;
use crate::history;
use crate::repo::Snapshot;

/// Cola de destino de una pregunta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Gatherer,
    Creator,
    Explainer,
    Processor,
    Completed,
}

impl Destination {
    pub fn as_str(self) -> &'static str {
        match self {
            Destination::Gatherer => "gatherer",
            Destination::Creator => "creator",
            Destination::Explainer => "explainer",
            Destination::Processor => "processor",
            Destination::Completed => "completed",
        }
    }

    /// Cola que atiende `role`; admin y student no tienen cola propia.
    pub fn for_role(role: Role) -> Option<Self> {
        match role {
            Role::Gatherer => Some(Destination::Gatherer),
            Role::Creator => Some(Destination::Creator),
            Role::Explainer => Some(Destination::Explainer),
            Role::Processor => Some(Destination::Processor),
            Role::Admin | Role::Student => None,
        }
    }

    pub fn role(self) -> Option<Role> {
        match self {
            Destination::Gatherer => Some(Role::Gatherer),
            Destination::Creator => Some(Role::Creator),
            Destination::Explainer => Some(Role::Explainer),
            Destination::Processor => Some(Role::Processor),
            Destination::Completed => None,
        }
    }

    /// Status resultante de mover una pregunta en `current` hacia esta cola.
    /// La cola del gatherer no tiene status propio: la pregunta conserva el
    /// que tenía.
    pub fn status_from(self, current: QuestionStatus) -> QuestionStatus {
        match self {
            Destination::Gatherer => current,
            Destination::Creator => QuestionStatus::PendingCreator,
            Destination::Explainer => QuestionStatus::PendingExplainer,
            Destination::Processor => QuestionStatus::PendingProcessor,
            Destination::Completed => QuestionStatus::Completed,
        }
    }

    fn of_status(status: QuestionStatus) -> Self {
        match status {
            QuestionStatus::PendingCreator => Destination::Creator,
            QuestionStatus::PendingExplainer => Destination::Explainer,
            QuestionStatus::PendingProcessor => Destination::Processor,
            QuestionStatus::Completed => Destination::Completed,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Siguiente destino de la pregunta, en orden de prioridad:
///
/// 1. Flag de creator/explainer sin resolver y editado después del flag por
///    el rol que debía corregir: vuelve al rol que levantó el flag.
/// 2. Con explicación y en `pending_processor`/`pending_explainer`:
///    `completed`.
/// 3. Variante, original con variantes o creator ya involucrado: `explainer`.
/// 4. En otro caso: `creator`.
pub fn next_destination(snap: &Snapshot) -> Destination {
    let q = &snap.question;

    if let Some(origin) = unresolved_flag_origin(snap) {
        let editors = [flag::correction_role(snap).unwrap_or(origin), Role::Admin];
        if history::updated_after_flag_by(&snap.history, &editors) {
            return Destination::for_role(origin).unwrap_or(Destination::Creator);
        }
    }

    if q.has_explanation() && matches!(q.status, QuestionStatus::PendingProcessor | QuestionStatus::PendingExplainer) {
        return Destination::Completed;
    }

    if snap.has_variant_lineage() || history::creator_involved(&snap.history) {
        return Destination::Explainer;
    }

    Destination::Creator
}

/// Rol (creator/explainer) de un flag pendiente o aprobado.
fn unresolved_flag_origin(snap: &Snapshot) -> Option<Role> {
    let q = &snap.question;
    if !q.is_flagged || !matches!(q.flag_status, FlagStatus::Pending | FlagStatus::Approved) {
        return None;
    }
    match q.flag_type {
        FlagType::Creator => Some(Role::Creator),
        FlagType::Explainer => Some(Role::Explainer),
        FlagType::Student | FlagType::None => None,
    }
}

/// Cola en la que la pregunta espera ahora mismo.
pub fn current_queue(snap: &Snapshot) -> Destination {
    let q = &snap.question;
    if flag::is_gatherer_rejected(snap) || (q.is_flagged && q.flag_status == FlagStatus::Pending) {
        return Destination::Processor;
    }
    if q.is_flagged && q.flag_status == FlagStatus::Approved {
        if let Some(dest) = flag::correction_role(snap).and_then(Destination::for_role) {
            return dest;
        }
    }
    Destination::of_status(q.status)
}
