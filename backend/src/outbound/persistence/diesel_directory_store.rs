//! PostgreSQL-backed `DirectoryStore` implementation using Diesel ORM.
//!
//! Registration idempotency rides on the unique email index: the insert is
//! `ON CONFLICT DO NOTHING`, so duplicates report back without mutating the
//! existing record.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{DirectoryError, DirectoryStore, RegistrationOutcome};
use crate::domain::{Email, Role, User};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the directory port.
#[derive(Clone)]
pub struct DieselDirectoryStore {
    pool: DbPool,
}

impl DieselDirectoryStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> DirectoryError {
    map_pool_error(error, DirectoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> DirectoryError {
    map_diesel_error(error, DirectoryError::query, DirectoryError::connection)
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, DirectoryError> {
    let UserRow { id, email, role } = row;
    let email = Email::new(&email).map_err(|err| DirectoryError::query(err.to_string()))?;
    let role = Role::parse(&role).map_err(|err| DirectoryError::query(err.to_string()))?;
    Ok(User { id, email, role })
}

#[async_trait]
impl DirectoryStore for DieselDirectoryStore {
    async fn insert_if_absent(&self, user: &User) -> Result<RegistrationOutcome, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewUserRow {
            id: user.id,
            email: user.email.as_str(),
            role: user.role.as_str(),
        };

        let inserted = diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict(users::email)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if inserted == 0 {
            Ok(RegistrationOutcome::AlreadyExists)
        } else {
            Ok(RegistrationOutcome::Created(user.clone()))
        }
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .filter(users::email.eq(email.as_str()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_user).transpose()
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<(), DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let updated = diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::role.eq(role.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if updated == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let deleted = diesel::delete(users::table.filter(users::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        if deleted == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, DirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_user).collect()
    }
}
