//! Errores de persistencia.
//! Mapea errores de Diesel / conexión a variantes semánticas y luego a
//! `WorkflowError` para el motor.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use exam_core::WorkflowError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("check violation: {0}")]
    CheckViolation(String),
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),
    #[error("not found")]
    NotFound,
    /// El `UPDATE ... WHERE status = ? AND flag_status = ?` no tocó filas.
    #[error("stale write on question {0}")]
    StaleWrite(Uuid),
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),
    #[error("row mapping error: {0}")]
    Mapping(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound,
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::UniqueViolation => Self::UniqueViolation(info.message().to_string()),
                DatabaseErrorKind::CheckViolation => Self::CheckViolation(info.message().to_string()),
                DatabaseErrorKind::ForeignKeyViolation => Self::ForeignKeyViolation(info.message().to_string()),
                DatabaseErrorKind::SerializationFailure => Self::SerializationConflict,
                other => Self::Unknown(format!("db error kind {:?}: {}", other, info.message())),
            },
            DieselError::DeserializationError(e) => Self::Mapping(format!("deser: {e}")),
            DieselError::SerializationError(e) => Self::Mapping(format!("ser: {e}")),
            DieselError::BrokenTransactionManager => Self::TransientIo("broken transaction manager".into()),
            DieselError::RollbackErrorOnCommit { rollback_error,
                                                 commit_error, } => {
                Self::Unknown(format!("rollback={rollback_error}; commit={commit_error}"))
            }
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Mapping(err.to_string())
    }
}

impl From<PersistenceError> for WorkflowError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::StaleWrite(id) => WorkflowError::Conflict(id),
            PersistenceError::NotFound => WorkflowError::NotFound("row".into()),
            PersistenceError::UniqueViolation(msg) | PersistenceError::CheckViolation(msg) => {
                WorkflowError::Validation(msg)
            }
            other => WorkflowError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_write_maps_to_conflict() {
        let id = Uuid::new_v4();
        assert_eq!(WorkflowError::from(PersistenceError::StaleWrite(id)), WorkflowError::Conflict(id));
        assert!(matches!(WorkflowError::from(PersistenceError::TransientIo("x".into())),
                         WorkflowError::Internal(_)));
        assert!(matches!(WorkflowError::from(PersistenceError::from(DieselError::NotFound)),
                         WorkflowError::NotFound(_)));
    }
}
