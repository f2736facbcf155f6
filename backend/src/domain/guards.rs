//! Composable authorisation guards.
//!
//! Guards are explicit functions returning a success/failure result,
//! sequenced by handlers before any persisted state is touched: token
//! verification always runs first (in the inbound extractor), then a role
//! or self check, then the handler body. No guard mutates state.

use super::error::Error;
use super::ports::{DirectoryError, DirectoryStore};
use super::token::Claims;
use super::user::{Email, Role, User};

/// Stable message for every 403 envelope.
pub const FORBIDDEN_MESSAGE: &str = "Access Forbidden";

/// A verified identity: the email asserted by a token whose signature and
/// expiry have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    email: Email,
}

impl Identity {
    /// Wrap a verified address.
    pub fn new(email: Email) -> Self {
        Self { email }
    }

    /// The verified address.
    pub fn email(&self) -> &Email {
        &self.email
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self::new(claims.email)
    }
}

/// Pass when the directory record for the verified email carries `role`.
///
/// The check reads the *persisted* role rather than anything embedded in
/// the token, so promotions and demotions take effect immediately without
/// re-authentication. Fails with `Forbidden` when no record exists or the
/// role differs; returns the record so handlers need no second lookup.
pub async fn require_role(
    directory: &dyn DirectoryStore,
    identity: &Identity,
    role: Role,
) -> Result<User, Error> {
    let user = directory
        .find_by_email(identity.email())
        .await
        .map_err(map_directory_error)?
        .ok_or_else(|| Error::forbidden(FORBIDDEN_MESSAGE))?;

    if user.role != role {
        return Err(Error::forbidden(FORBIDDEN_MESSAGE));
    }
    Ok(user)
}

/// Pass only when the verified email equals the path- or query-supplied
/// address; prevents one user reading another's role or resource list.
pub fn require_self(identity: &Identity, email: &Email) -> Result<(), Error> {
    if identity.email() == email {
        Ok(())
    } else {
        Err(Error::forbidden(FORBIDDEN_MESSAGE))
    }
}

fn map_directory_error(error: DirectoryError) -> Error {
    match error {
        DirectoryError::Connection { message } => Error::service_unavailable(message),
        other => Error::internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    //! Guard behaviour against an in-memory directory.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::RegistrationOutcome;

    #[derive(Default)]
    struct MemoryDirectory {
        records: Mutex<HashMap<String, User>>,
    }

    impl MemoryDirectory {
        fn with_user(email: &str, role: Role) -> Self {
            let email = Email::new(email).expect("valid email");
            let user = User {
                id: Uuid::new_v4(),
                email: email.clone(),
                role,
            };
            let directory = Self::default();
            directory
                .records
                .lock()
                .expect("directory lock")
                .insert(email.as_str().to_owned(), user);
            directory
        }
    }

    #[async_trait]
    impl DirectoryStore for MemoryDirectory {
        async fn insert_if_absent(
            &self,
            user: &User,
        ) -> Result<RegistrationOutcome, DirectoryError> {
            let mut records = self.records.lock().expect("directory lock");
            if records.contains_key(user.email.as_str()) {
                return Ok(RegistrationOutcome::AlreadyExists);
            }
            records.insert(user.email.as_str().to_owned(), user.clone());
            Ok(RegistrationOutcome::Created(user.clone()))
        }

        async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DirectoryError> {
            Ok(self
                .records
                .lock()
                .expect("directory lock")
                .get(email.as_str())
                .cloned())
        }

        async fn set_role(&self, id: Uuid, role: Role) -> Result<(), DirectoryError> {
            let mut records = self.records.lock().expect("directory lock");
            let user = records
                .values_mut()
                .find(|user| user.id == id)
                .ok_or(DirectoryError::NotFound)?;
            user.role = role;
            Ok(())
        }

        async fn delete(&self, id: Uuid) -> Result<(), DirectoryError> {
            let mut records = self.records.lock().expect("directory lock");
            let key = records
                .values()
                .find(|user| user.id == id)
                .map(|user| user.email.as_str().to_owned())
                .ok_or(DirectoryError::NotFound)?;
            records.remove(&key);
            Ok(())
        }

        async fn list(&self) -> Result<Vec<User>, DirectoryError> {
            Ok(self
                .records
                .lock()
                .expect("directory lock")
                .values()
                .cloned()
                .collect())
        }
    }

    fn identity(email: &str) -> Identity {
        Identity::new(Email::new(email).expect("valid email"))
    }

    #[tokio::test]
    async fn require_role_passes_for_a_matching_persisted_role() {
        let directory = MemoryDirectory::with_user("ana@x.com", Role::Instructor);
        let user = require_role(&directory, &identity("ana@x.com"), Role::Instructor)
            .await
            .expect("guard passes");
        assert_eq!(user.role, Role::Instructor);
    }

    #[tokio::test]
    async fn require_role_rejects_a_mismatched_role() {
        let directory = MemoryDirectory::with_user("ana@x.com", Role::Student);
        let err = require_role(&directory, &identity("ana@x.com"), Role::Admin)
            .await
            .expect_err("guard rejects");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), FORBIDDEN_MESSAGE);
    }

    #[tokio::test]
    async fn require_role_rejects_an_unknown_identity() {
        let directory = MemoryDirectory::default();
        let err = require_role(&directory, &identity("ghost@x.com"), Role::Student)
            .await
            .expect_err("guard rejects");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn promotions_take_effect_without_reauthentication() {
        let directory = MemoryDirectory::with_user("ana@x.com", Role::Unset);
        let subject = identity("ana@x.com");

        let before = require_role(&directory, &subject, Role::Instructor).await;
        assert!(before.is_err());

        let id = directory
            .find_by_email(subject.email())
            .await
            .expect("lookup")
            .expect("present")
            .id;
        directory
            .set_role(id, Role::Instructor)
            .await
            .expect("promotion");

        // Same token, new persisted role: the guard now passes.
        let after = require_role(&directory, &subject, Role::Instructor).await;
        assert!(after.is_ok());
    }

    #[rstest]
    #[case("ada@x.com", "ada@x.com", true)]
    #[case("ada@x.com", "Ada@X.com", true)]
    #[case("ada@x.com", "eve@x.com", false)]
    fn require_self_only_passes_for_the_tokens_own_email(
        #[case] token_email: &str,
        #[case] requested: &str,
        #[case] passes: bool,
    ) {
        let subject = identity(token_email);
        let requested = Email::new(requested).expect("valid email");
        let result = require_self(&subject, &requested);
        assert_eq!(result.is_ok(), passes);
        if let Err(err) = result {
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }
}
