//! exam-policies – Políticas configurables del workflow de revisión
//!
//! Agrupa las decisiones que el dominio deja abiertas y que se eligen por
//! configuración: si una pregunta completada puede volver a marcarse con flag y
//! cuándo la asignación explícita de un creator/explainer es obligatoria. Las
//! políticas son valores deterministas y serializables para que el motor pueda
//! registrarlas junto a sus decisiones.

use exam_domain::{Question, QuestionStatus, Role};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Política para re-flag de preguntas ya completadas que tuvieron un flag
/// resuelto anteriormente.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReflagPolicy {
    /// Una pregunta completada puede recibir flags nuevos sin límite.
    Allow,
    /// Tras resolverse un flag, una pregunta completada ya no acepta otro.
    Deny,
}

impl Default for ReflagPolicy {
    fn default() -> Self {
        ReflagPolicy::Allow
    }
}

impl FromStr for ReflagPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow" => Ok(ReflagPolicy::Allow),
            "deny" => Ok(ReflagPolicy::Deny),
            other => Err(format!("reflag policy desconocida: {other}")),
        }
    }
}

/// Parámetros de asignación.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentPolicy {
    /// Si es `true`, toda ruta hacia creator/explainer exige asignar un
    /// usuario concreto cuando el campo correspondiente está vacío.
    pub require_for_all: bool,
}

/// Datos que una política de flags necesita para decidir.
#[derive(Clone, Copy, Debug)]
pub struct FlagContext<'a> {
    pub question: &'a Question,
    /// `true` si el historial ya registra algún flag sobre la pregunta.
    pub previously_flagged: bool,
}

/// Veredicto de una política.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyVerdict {
    Allow,
    Deny(String),
}

/// Contrato de políticas de flag.
pub trait FlagPolicy {
    fn id(&self) -> &'static str;
    fn check(&self, ctx: &FlagContext<'_>) -> PolicyVerdict;
}

impl FlagPolicy for ReflagPolicy {
    fn id(&self) -> &'static str {
        "reflag_completed"
    }

    fn check(&self, ctx: &FlagContext<'_>) -> PolicyVerdict {
        match self {
            ReflagPolicy::Allow => PolicyVerdict::Allow,
            ReflagPolicy::Deny if ctx.question.status == QuestionStatus::Completed && ctx.previously_flagged => {
                PolicyVerdict::Deny(format!("la pregunta {} ya tuvo un flag resuelto", ctx.question.id))
            }
            ReflagPolicy::Deny => PolicyVerdict::Allow,
        }
    }
}

impl AssignmentPolicy {
    /// Indica si rutear `question` hacia `destination_role` exige una
    /// asignación explícita (cuando el campo aún está vacío).
    ///
    /// Las variantes que van a explainer siempre la exigen.
    pub fn assignment_mandatory(&self, question: &Question, destination_role: Role) -> bool {
        if !matches!(destination_role, Role::Creator | Role::Explainer) {
            return false;
        }
        if question.is_variant && destination_role == Role::Explainer {
            return true;
        }
        self.require_for_all
    }
}

/// Conjunto de políticas que consume el motor.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkflowPolicy {
    pub reflag: ReflagPolicy,
    pub assignment: AssignmentPolicy,
}

impl WorkflowPolicy {
    /// Representación JSON para auditoría/logs.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "reflag": self.reflag,
            "assignment": { "require_for_all": self.assignment.require_for_all },
        })
    }
}
