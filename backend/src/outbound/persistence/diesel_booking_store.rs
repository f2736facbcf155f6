//! PostgreSQL-backed `BookingStore` implementation using Diesel ORM.
//!
//! The pending-only deletion is a single conditional DELETE; the refusal
//! reason is resolved with a follow-up read only after the delete matched
//! nothing.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{BookingError, BookingStore, DeletePendingOutcome};
use crate::domain::{Booking, BookingStatus, Email};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{BookingRow, NewBookingRow};
use super::pool::{DbPool, PoolError};
use super::schema::bookings;

/// Diesel-backed implementation of the booking port.
#[derive(Clone)]
pub struct DieselBookingStore {
    pool: DbPool,
}

impl DieselBookingStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> BookingError {
    map_pool_error(error, BookingError::connection)
}

fn map_diesel(error: diesel::result::Error) -> BookingError {
    map_diesel_error(error, BookingError::query, BookingError::connection)
}

/// Convert a database row into a validated domain booking.
fn row_to_booking(row: BookingRow) -> Result<Booking, BookingError> {
    let BookingRow {
        id,
        student_email,
        class_id,
        status,
    } = row;

    let student_email =
        Email::new(&student_email).map_err(|err| BookingError::query(err.to_string()))?;
    let status = BookingStatus::parse(&status).map_err(|err| BookingError::query(err.to_string()))?;

    Ok(Booking {
        id,
        student_email,
        class_id,
        status,
    })
}

#[async_trait]
impl BookingStore for DieselBookingStore {
    async fn insert(&self, booking: &Booking) -> Result<(), BookingError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewBookingRow {
            id: booking.id,
            student_email: booking.student_email.as_str(),
            class_id: booking.class_id,
            status: booking.status.as_str(),
        };

        diesel::insert_into(bookings::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = bookings::table
            .filter(bookings::id.eq(id))
            .select(BookingRow::as_select())
            .first::<BookingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_booking).transpose()
    }

    async fn list_by_student(&self, student: &Email) -> Result<Vec<Booking>, BookingError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<BookingRow> = bookings::table
            .filter(bookings::student_email.eq(student.as_str()))
            .select(BookingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_booking).collect()
    }

    async fn delete_pending(
        &self,
        id: Uuid,
        student: &Email,
    ) -> Result<DeletePendingOutcome, BookingError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let deleted = diesel::delete(
            bookings::table.filter(
                bookings::id
                    .eq(id)
                    .and(bookings::student_email.eq(student.as_str()))
                    .and(bookings::status.eq(BookingStatus::Pending.as_str())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel)?;

        if deleted > 0 {
            return Ok(DeletePendingOutcome::Deleted);
        }

        // The conditional delete matched nothing; read the row to report why.
        let row = bookings::table
            .filter(bookings::id.eq(id))
            .select(BookingRow::as_select())
            .first::<BookingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        match row {
            None => Ok(DeletePendingOutcome::Missing),
            Some(row) if row.student_email != student.as_str() => {
                Ok(DeletePendingOutcome::NotOwner)
            }
            Some(_) => Ok(DeletePendingOutcome::NotPending),
        }
    }
}
