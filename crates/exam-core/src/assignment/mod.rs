//! Resolución de asignaciones creator/explainer.
//!
//! Las consultas de vista previa (UI) pueden servirse desde una cache con TTL;
//! la asignación que se confirma siempre revalida contra el directorio.
mod directory;

pub use directory::{InMemoryUserDirectory, UserDirectory};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use exam_domain::{Question, Role, UserAccount};
use log::debug;
use uuid::Uuid;

use crate::config::ttl_duration;
use crate::errors::WorkflowError;
use crate::routing::Destination;

/// `true` cuando el campo de asignación del rol destino está vacío.
pub fn requires_assignment(question: &Question, destination: Destination) -> bool {
    match destination {
        Destination::Creator => question.assigned_creator_id.is_none(),
        Destination::Explainer => question.assigned_explainer_id.is_none(),
        _ => false,
    }
}

#[derive(Debug, Clone)]
struct CachedUser {
    account: Option<UserAccount>,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AssignmentResolver<D: UserDirectory> {
    directory: D,
    cache: DashMap<Uuid, CachedUser>,
    ttl: Duration,
}

impl<D: UserDirectory> AssignmentResolver<D> {
    pub fn new(directory: D, cache_ttl_secs: i64) -> Self {
        Self { directory,
               cache: DashMap::new(),
               ttl: ttl_duration(cache_ttl_secs) }
    }

    /// Acceso mutable al directorio; invalida la cache.
    pub fn directory_mut(&mut self) -> &mut D {
        self.cache.clear();
        &mut self.directory
    }

    fn fetch(&self, user_id: Uuid) -> Result<Option<UserAccount>, WorkflowError> {
        let account = self.directory.find(user_id)?;
        self.cache.insert(user_id,
                          CachedUser { account: account.clone(),
                                       fetched_at: Utc::now() });
        Ok(account)
    }

    fn cached(&self, user_id: Uuid) -> Result<Option<UserAccount>, WorkflowError> {
        if let Some(hit) = self.cache.get(&user_id) {
            if Utc::now() - hit.fetched_at < self.ttl {
                return Ok(hit.account.clone());
            }
        }
        self.fetch(user_id)
    }

    fn check(user_id: Uuid, account: Option<UserAccount>, required: Role) -> Result<UserAccount, WorkflowError> {
        let account = account.ok_or_else(|| WorkflowError::NotFound(format!("user {user_id}")))?;
        if !account.holds(required) {
            return Err(WorkflowError::RoleMismatch { expected: required.as_str().to_string(),
                                                     actual: account.role.as_str().to_string() });
        }
        if !account.active {
            return Err(WorkflowError::UserInactive(user_id));
        }
        Ok(account)
    }

    /// Vista previa: puede responder desde la cache.
    pub fn preview(&self, user_id: Uuid, required: Role) -> Result<UserAccount, WorkflowError> {
        Self::check(user_id, self.cached(user_id)?, required)
    }

    /// Validación contra el directorio, sin cache.
    pub fn validate(&self, user_id: Uuid, required: Role) -> Result<UserAccount, WorkflowError> {
        Self::check(user_id, self.fetch(user_id)?, required)
    }

    /// Valida al usuario y lo fija en el campo del rol requerido.
    pub fn assign(&self, question: &mut Question, user_id: Uuid, required: Role) -> Result<(), WorkflowError> {
        let account = self.validate(user_id, required)?;
        match required {
            Role::Creator => question.assigned_creator_id = Some(account.id),
            Role::Explainer => question.assigned_explainer_id = Some(account.id),
            other => {
                return Err(WorkflowError::Validation(format!("no se asignan preguntas al rol {other}")));
            }
        }
        debug!("asignado {} como {} en {}", account.id, required, question.id);
        Ok(())
    }
}
