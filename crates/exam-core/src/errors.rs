//! Errores del motor de workflow.
//!
//! Todas las variantes son síncronas y acotadas a un único comando: ninguna es
//! fatal para el proceso y el motor no reintenta nada por su cuenta.

use exam_domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum WorkflowError {
    /// Texto obligatorio vacío o contenido inválido.
    #[error("validation error: {0}")]
    Validation(String),
    /// La acción no es legal para el `status`/`flag_status` actual.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    /// Resolución de un flag inexistente o que no está pendiente.
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("role mismatch: expected {expected}, got {actual}")]
    RoleMismatch { expected: String, actual: String },
    #[error("user {0} is not active")]
    UserInactive(Uuid),
    /// El estado observado por el cliente ya no coincide con el almacenado.
    #[error("conflict: question {0} changed since it was observed")]
    Conflict(Uuid),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl From<DomainError> for WorkflowError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::ValidationError(msg) => WorkflowError::Validation(msg),
            DomainError::SerializationError(msg) => WorkflowError::Internal(msg),
        }
    }
}

/// Clasificación gruesa de errores para decidir cómo reacciona el cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Entrada del usuario inválida (corregir y reenviar).
    Validation,
    /// Se resuelve refrescando el estado y reintentando el mismo comando.
    Transient,
    /// Requiere elegir otra acción.
    Permanent,
    /// Fallo de infraestructura.
    Runtime,
}

pub fn classify_error(e: &WorkflowError) -> ErrorClass {
    match e {
        WorkflowError::Validation(_) => ErrorClass::Validation,
        WorkflowError::Conflict(_) => ErrorClass::Transient,
        WorkflowError::Internal(_) => ErrorClass::Runtime,
        WorkflowError::InvalidTransition(_)
        | WorkflowError::InvalidState(_)
        | WorkflowError::RoleMismatch { .. }
        | WorkflowError::UserInactive(_)
        | WorkflowError::NotFound(_) => ErrorClass::Permanent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflict_is_transient() {
        assert_eq!(classify_error(&WorkflowError::Conflict(Uuid::nil())), ErrorClass::Transient);
        assert_eq!(classify_error(&WorkflowError::InvalidState("x".into())), ErrorClass::Permanent);
        assert_eq!(classify_error(&WorkflowError::Validation("x".into())), ErrorClass::Validation);
        assert_eq!(classify_error(&WorkflowError::Internal("x".into())), ErrorClass::Runtime);
    }

    #[test]
    fn domain_validation_maps_to_validation() {
        let e: WorkflowError = DomainError::ValidationError("vacío".into()).into();
        assert_eq!(e, WorkflowError::Validation("vacío".into()));
    }

    #[test]
    fn role_mismatch_message() {
        let e = WorkflowError::RoleMismatch { expected: "processor".into(),
                                              actual: "student".into() };
        assert_eq!(e.to_string(), "role mismatch: expected processor, got student");
    }
}
