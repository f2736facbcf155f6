//! Class offerings and their review lifecycle.
//!
//! An offering is created by an instructor in the pending state, reviewed by
//! an admin, and — once approved — booked by students. Seats only ever move
//! through the settlement transaction.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::Email;

/// Review state of a class offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OfferingStatus {
    /// Submitted, awaiting admin review.
    Pending,
    /// Visible to students and bookable.
    Approved,
    /// Rejected; the admin may attach feedback.
    Denied,
}

/// Error returned when a stored status value is not part of the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised offering status: {value}")]
pub struct OfferingStatusParseError {
    /// The offending raw value.
    pub value: String,
}

impl OfferingStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    /// Parse a persisted status, rejecting anything outside the closed set.
    pub fn parse(value: &str) -> Result<Self, OfferingStatusParseError> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            other => Err(OfferingStatusParseError {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for OfferingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures raised when constructing a [`ClassOffering`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OfferingValidationError {
    /// The name was empty once trimmed.
    #[error("offering name must not be empty")]
    EmptyName,
    /// Seats were negative.
    #[error("seat count must not be negative")]
    NegativeSeats,
    /// The price was negative.
    #[error("price must not be negative")]
    NegativePrice,
}

/// A class offering in the catalogue.
///
/// ## Invariants
/// - `seats` is never negative; only the settlement transaction decrements it.
/// - `status` starts at [`OfferingStatus::Pending`] and is mutated only by
///   admin review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassOffering {
    /// Primary identifier.
    pub id: Uuid,
    /// The submitting instructor.
    pub owner_email: Email,
    /// Display name shown to students.
    pub name: String,
    /// Remaining seat capacity.
    pub seats: i32,
    /// Price per seat.
    #[schema(value_type = String, example = "49.99")]
    pub price: Decimal,
    /// Review state.
    pub status: OfferingStatus,
    /// Admin feedback, populated on denial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ClassOffering {
    /// Build a pending offering from an instructor submission.
    ///
    /// # Examples
    /// ```
    /// use coursedesk_backend::domain::{ClassOffering, Email, OfferingStatus};
    /// use rust_decimal_macros::dec;
    ///
    /// let offering = ClassOffering::submit(
    ///     Email::new("ana@x.com").expect("valid email"),
    ///     "Intro to Sketching",
    ///     12,
    ///     dec!(49.99),
    /// )
    /// .expect("valid offering");
    /// assert_eq!(offering.status, OfferingStatus::Pending);
    /// ```
    pub fn submit(
        owner_email: Email,
        name: impl Into<String>,
        seats: i32,
        price: Decimal,
    ) -> Result<Self, OfferingValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(OfferingValidationError::EmptyName);
        }
        if seats < 0 {
            return Err(OfferingValidationError::NegativeSeats);
        }
        if price.is_sign_negative() {
            return Err(OfferingValidationError::NegativePrice);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_email,
            name,
            seats,
            price,
            status: OfferingStatus::Pending,
            feedback: None,
        })
    }
}
