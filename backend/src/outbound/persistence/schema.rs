//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly; Diesel uses
//! them for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Registered users.
    ///
    /// `email` carries a unique index; registration relies on it for
    /// idempotent inserts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised, unique address.
        email -> Varchar,
        /// Closed role set, stored as text and parsed at the boundary.
        role -> Varchar,
    }
}

diesel::table! {
    /// Class offerings submitted by instructors.
    class_offerings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Email of the submitting instructor.
        owner_email -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Remaining seat capacity; a CHECK constraint keeps it >= 0.
        seats -> Int4,
        /// Price per seat.
        price -> Numeric,
        /// Review state, stored as text and parsed at the boundary.
        status -> Varchar,
        /// Admin feedback, populated on denial.
        feedback -> Nullable<Text>,
    }
}

diesel::table! {
    /// Seat bookings.
    bookings (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Email of the booking student.
        student_email -> Varchar,
        /// The booked offering.
        class_id -> Uuid,
        /// Lifecycle state, stored as text and parsed at the boundary.
        status -> Varchar,
    }
}

diesel::table! {
    /// Append-only payment ledger.
    payments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// The booking the payment settled.
        booking_id -> Uuid,
        /// The offering whose seat was consumed.
        class_id -> Uuid,
        /// Amount charged.
        amount -> Numeric,
        /// Email of the paying student.
        student_email -> Varchar,
        /// Commit instant of the settlement transaction.
        recorded_at -> Timestamptz,
    }
}
