//! Bookings: a student's claim on one seat of an approved offering.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::Email;

/// Lifecycle state of a booking.
///
/// The only transition is pending → paid, applied exclusively by the
/// settlement transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting payment; deletable by the owning student.
    Pending,
    /// Settled; immutable.
    Paid,
}

/// Error returned when a stored status value is not part of the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised booking status: {value}")]
pub struct BookingStatusParseError {
    /// The offending raw value.
    pub value: String,
}

impl BookingStatus {
    /// Stable storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    /// Parse a persisted status, rejecting anything outside the closed set.
    pub fn parse(value: &str) -> Result<Self, BookingStatusParseError> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(BookingStatusParseError {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student's booking of one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Primary identifier.
    pub id: Uuid,
    /// The booking student; taken from the verified identity, never the body.
    pub student_email: Email,
    /// The booked offering.
    pub class_id: Uuid,
    /// Lifecycle state.
    pub status: BookingStatus,
}

impl Booking {
    /// Build a pending booking for the given student and class.
    pub fn place(student_email: Email, class_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_email,
            class_id,
            status: BookingStatus::Pending,
        }
    }
}
