//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{bookings, class_offerings, payments, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub role: &'a str,
}

// ---------------------------------------------------------------------------
// Class offering models
// ---------------------------------------------------------------------------

/// Row struct for reading from the class_offerings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = class_offerings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OfferingRow {
    pub id: Uuid,
    pub owner_email: String,
    pub name: String,
    pub seats: i32,
    pub price: Decimal,
    pub status: String,
    pub feedback: Option<String>,
}

/// Insertable struct for creating new offerings.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = class_offerings)]
pub(crate) struct NewOfferingRow<'a> {
    pub id: Uuid,
    pub owner_email: &'a str,
    pub name: &'a str,
    pub seats: i32,
    pub price: Decimal,
    pub status: &'a str,
    pub feedback: Option<&'a str>,
}

/// Changeset applying an admin review verdict.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = class_offerings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OfferingReviewUpdate<'a> {
    pub status: &'a str,
    pub feedback: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Booking models
// ---------------------------------------------------------------------------

/// Row struct for reading from the bookings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: Uuid,
    pub student_email: String,
    pub class_id: Uuid,
    pub status: String,
}

/// Insertable struct for creating new bookings.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub(crate) struct NewBookingRow<'a> {
    pub id: Uuid,
    pub student_email: &'a str,
    pub class_id: Uuid,
    pub status: &'a str,
}

// ---------------------------------------------------------------------------
// Payment models
// ---------------------------------------------------------------------------

/// Row struct for reading from the payments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub class_id: Uuid,
    pub amount: Decimal,
    pub student_email: String,
    pub recorded_at: DateTime<Utc>,
}

/// Insertable struct for appending ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub(crate) struct NewPaymentRow<'a> {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub class_id: Uuid,
    pub amount: Decimal,
    pub student_email: &'a str,
    pub recorded_at: DateTime<Utc>,
}
