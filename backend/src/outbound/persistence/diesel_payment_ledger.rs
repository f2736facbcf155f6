//! PostgreSQL-backed read side of the payment ledger.
//!
//! Ledger writes happen only inside the settlement transaction; this adapter
//! serves history lookups, matching on the student email column.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PaymentLedger, PaymentLedgerError};
use crate::domain::{Email, Payment};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::PaymentRow;
use super::pool::{DbPool, PoolError};
use super::schema::payments;

/// Diesel-backed implementation of the payment ledger read port.
#[derive(Clone)]
pub struct DieselPaymentLedger {
    pool: DbPool,
}

impl DieselPaymentLedger {
    /// Create a new ledger reader with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> PaymentLedgerError {
    map_pool_error(error, PaymentLedgerError::connection)
}

fn map_diesel(error: diesel::result::Error) -> PaymentLedgerError {
    map_diesel_error(
        error,
        PaymentLedgerError::query,
        PaymentLedgerError::connection,
    )
}

/// Convert a database row into a validated domain payment.
pub(crate) fn row_to_payment(row: PaymentRow) -> Result<Payment, PaymentLedgerError> {
    let PaymentRow {
        id,
        booking_id,
        class_id,
        amount,
        student_email,
        recorded_at,
    } = row;

    let student_email =
        Email::new(&student_email).map_err(|err| PaymentLedgerError::query(err.to_string()))?;

    Ok(Payment {
        id,
        booking_id,
        class_id,
        amount,
        student_email,
        recorded_at,
    })
}

#[async_trait]
impl PaymentLedger for DieselPaymentLedger {
    async fn list_by_student(&self, student: &Email) -> Result<Vec<Payment>, PaymentLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<PaymentRow> = payments::table
            .filter(payments::student_email.eq(student.as_str()))
            .select(PaymentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_payment).collect()
    }
}
