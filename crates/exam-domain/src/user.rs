use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Role;

/// Cuenta de usuario tal como la expone el directorio externo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub role: Role,
    /// Rol adicional concedido a un administrador (p.ej. admin que también
    /// explica preguntas).
    pub admin_role: Option<Role>,
    pub active: bool,
}

impl UserAccount {
    pub fn new(role: Role) -> Self {
        Self { id: Uuid::new_v4(),
               role,
               admin_role: None,
               active: true }
    }

    pub fn with_admin_role(mut self, role: Role) -> Self {
        self.admin_role = Some(role);
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// `true` si el rol principal o el `admin_role` coinciden con `required`.
    pub fn holds(&self, required: Role) -> bool {
        self.role == required || self.admin_role == Some(required)
    }
}
