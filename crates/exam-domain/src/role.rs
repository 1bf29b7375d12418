use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Rol con el que actúa un usuario dentro del pipeline de revisión.
///
/// El orden natural del pipeline es `Gatherer -> Creator -> Explainer ->
/// Processor`. `Admin` puede actuar en la capacidad de cualquiera de ellos y
/// `Student` sólo interviene levantando flags sobre preguntas publicadas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Gatherer,
    Creator,
    Explainer,
    Processor,
    Admin,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Gatherer => "gatherer",
            Role::Creator => "creator",
            Role::Explainer => "explainer",
            Role::Processor => "processor",
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }

    /// Roles con autoridad de aprobación final (resolución de flags incluida).
    pub fn is_processor_like(self) -> bool {
        matches!(self, Role::Processor | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gatherer" => Ok(Role::Gatherer),
            "creator" => Ok(Role::Creator),
            "explainer" => Ok(Role::Explainer),
            "processor" => Ok(Role::Processor),
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            other => Err(DomainError::ValidationError(format!("rol desconocido: {other}"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
