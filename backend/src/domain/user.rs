//! User aggregate, validated email addresses, and the closed role set.
//!
//! Roles are a closed enumeration rather than free-form strings; the
//! persistence layer parses the stored value through [`Role::parse`] and
//! rejects anything it does not recognise.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Platform roles, ordered by no particular privilege hierarchy.
///
/// A freshly registered user carries [`Role::Unset`] until an administrator
/// promotes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Registered but not yet assigned a role.
    Unset,
    /// May book seats and pay for approved classes.
    Student,
    /// May submit class offerings for review.
    Instructor,
    /// May review offerings and manage the directory.
    Admin,
}

/// Error returned when a stored role value is not part of the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised role value: {value}")]
pub struct RoleParseError {
    /// The offending raw value.
    pub value: String,
}

impl Role {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Admin => "admin",
        }
    }

    /// Parse a persisted role value, rejecting anything outside the closed set.
    ///
    /// # Examples
    /// ```
    /// use coursedesk_backend::domain::Role;
    ///
    /// assert_eq!(Role::parse("admin"), Ok(Role::Admin));
    /// assert!(Role::parse("superuser").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, RoleParseError> {
        match value {
            "unset" => Ok(Self::Unset),
            "student" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            "admin" => Ok(Self::Admin),
            other => Err(RoleParseError {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures raised when constructing an [`Email`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailValidationError {
    /// The address was empty once trimmed.
    #[error("email must not be empty")]
    Empty,
    /// The address lacks an `@` separator.
    #[error("email must contain an '@' separator")]
    MissingSeparator,
}

/// Validated, case-normalised email address.
///
/// ## Invariants
/// - Trimmed of surrounding whitespace and lowercased, so directory lookups
///   and `require_self` comparisons are case-insensitive.
/// - Contains at least one `@`.
///
/// # Examples
/// ```
/// use coursedesk_backend::domain::Email;
///
/// let email = Email::new("  Ada@Example.COM ").expect("valid email");
/// assert_eq!(email.as_str(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Construct a validated email from raw input.
    pub fn new(value: impl AsRef<str>) -> Result<Self, EmailValidationError> {
        let normalized = value.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(EmailValidationError::Empty);
        }
        if !normalized.contains('@') {
            return Err(EmailValidationError::MissingSeparator);
        }
        Ok(Self(normalized))
    }

    /// Borrow the normalised address.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for Email {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

/// Directory record for a registered user.
///
/// Created on first registration; the role is mutated only through admin
/// promotion and the record removed only through explicit admin deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Primary identifier.
    pub id: Uuid,
    /// Unique, normalised address; the registration idempotency key.
    pub email: Email,
    /// Current persisted role.
    pub role: Role,
}

impl User {
    /// Build a fresh directory record with [`Role::Unset`].
    pub fn register(email: Email) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            role: Role::Unset,
        }
    }
}
