use diesel::prelude::*;
use uuid::Uuid;

use exam_core::{UserDirectory, WorkflowError};
use exam_domain::{Role, UserAccount};

use super::{with_retry, ConnectionProvider};
use crate::error::PersistenceError;
use crate::schema::users;

#[derive(Queryable, Insertable, AsChangeset, Debug)]
#[diesel(table_name = users)]
struct UserRow {
    id: Uuid,
    role: String,
    admin_role: Option<String>,
    active: bool,
}

impl UserRow {
    fn into_account(self) -> Result<UserAccount, PersistenceError> {
        let role: Role = self.role
                             .parse()
                             .map_err(|e| PersistenceError::Mapping(format!("{e}")))?;
        let admin_role = self.admin_role
                             .map(|r| r.parse::<Role>())
                             .transpose()
                             .map_err(|e| PersistenceError::Mapping(format!("{e}")))?;
        Ok(UserAccount { id: self.id,
                         role,
                         admin_role,
                         active: self.active })
    }
}

impl From<&UserAccount> for UserRow {
    fn from(a: &UserAccount) -> Self {
        Self { id: a.id,
               role: a.role.as_str().to_string(),
               admin_role: a.admin_role.map(|r| r.as_str().to_string()),
               active: a.active }
    }
}

/// Directorio de usuarios sobre la tabla `users`.
pub struct PgUserDirectory<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgUserDirectory<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Alta o actualización de una cuenta (usado por el CLI y los tests).
    pub fn upsert(&self, account: &UserAccount) -> Result<(), PersistenceError> {
        let row = UserRow::from(account);
        with_retry(|| {
            let mut conn = self.provider.connection()?;
            diesel::insert_into(users::table).values(&row)
                                             .on_conflict(users::id)
                                             .do_update()
                                             .set(&row)
                                             .execute(&mut conn)
                                             .map(|_| ())
                                             .map_err(PersistenceError::from)
        })
    }
}

impl<P: ConnectionProvider> UserDirectory for PgUserDirectory<P> {
    fn find(&self, user_id: Uuid) -> Result<Option<UserAccount>, WorkflowError> {
        let row: Option<UserRow> = with_retry(|| {
                                       let mut conn = self.provider.connection()?;
                                       users::table.find(user_id)
                                                   .first(&mut conn)
                                                   .optional()
                                                   .map_err(PersistenceError::from)
                                   })?;
        Ok(row.map(UserRow::into_account).transpose()?)
    }
}
