use exam_domain::UserAccount;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::WorkflowError;

/// Directorio externo de usuarios (solo lectura para el motor).
pub trait UserDirectory {
    fn find(&self, user_id: Uuid) -> Result<Option<UserAccount>, WorkflowError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryUserDirectory {
    users: HashMap<Uuid, UserAccount>,
}

impl InMemoryUserDirectory {
    /// Registra la cuenta y devuelve su id.
    pub fn insert(&mut self, account: UserAccount) -> Uuid {
        let id = account.id;
        self.users.insert(id, account);
        id
    }

    pub fn deactivate(&mut self, user_id: Uuid) -> bool {
        match self.users.get_mut(&user_id) {
            Some(u) => {
                u.active = false;
                true
            }
            None => false,
        }
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find(&self, user_id: Uuid) -> Result<Option<UserAccount>, WorkflowError> {
        Ok(self.users.get(&user_id).cloned())
    }
}
