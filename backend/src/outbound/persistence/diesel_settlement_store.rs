//! PostgreSQL-backed settlement transaction.
//!
//! All three writes run inside one Diesel transaction. The booking
//! transition and the seat decrement are single conditional UPDATE
//! statements, so concurrent settlements against the same booking or the
//! same class serialise on the row locks: at most one transition wins and
//! the seat count can never go negative. A refused step aborts the
//! transaction and rolls the payment insert back, leaving no orphaned
//! ledger entry.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{SettlementStore, SettlementStoreError};
use crate::domain::{
    BookingStatus, Payment, SettlementOutcome, SettlementRefusal, SettlementRequest,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewPaymentRow;
use super::pool::{DbPool, PoolError};
use super::schema::{bookings, class_offerings, payments};

/// Diesel-backed implementation of the settlement port.
#[derive(Clone)]
pub struct DieselSettlementStore {
    pool: DbPool,
}

impl DieselSettlementStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> SettlementStoreError {
    map_pool_error(error, SettlementStoreError::connection)
}

fn map_diesel(error: diesel::result::Error) -> SettlementStoreError {
    map_diesel_error(
        error,
        SettlementStoreError::transaction,
        SettlementStoreError::connection,
    )
}

/// Internal transaction error: either a business refusal (rolls back, not an
/// adapter failure) or a genuine Diesel error.
enum TxError {
    Refused(SettlementRefusal),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

#[async_trait]
impl SettlementStore for DieselSettlementStore {
    async fn settle(
        &self,
        request: &SettlementRequest,
    ) -> Result<SettlementOutcome, SettlementStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let payment_id = Uuid::new_v4();
        let recorded_at = Utc::now();
        let booking_id = request.booking_id;
        let class_id = request.class_id;
        let new_row = NewPaymentRow {
            id: payment_id,
            booking_id,
            class_id,
            amount: request.amount,
            student_email: request.student_email.as_str(),
            recorded_at,
        };

        let result = conn
            .transaction::<(), TxError, _>(|conn| {
                async move {
                    diesel::insert_into(payments::table)
                        .values(&new_row)
                        .execute(conn)
                        .await?;

                    // Atomic check-then-set: only a pending booking flips to
                    // paid, which is the double-payment guard.
                    let transitioned = diesel::update(
                        bookings::table.filter(
                            bookings::id
                                .eq(booking_id)
                                .and(bookings::status.eq(BookingStatus::Pending.as_str())),
                        ),
                    )
                    .set(bookings::status.eq(BookingStatus::Paid.as_str()))
                    .execute(conn)
                    .await?;

                    if transitioned == 0 {
                        let known: i64 = bookings::table
                            .filter(bookings::id.eq(booking_id))
                            .count()
                            .get_result(conn)
                            .await?;
                        let refusal = if known == 0 {
                            SettlementRefusal::BookingMissing
                        } else {
                            SettlementRefusal::BookingNotPending
                        };
                        return Err(TxError::Refused(refusal));
                    }

                    // Atomic check-then-decrement: seats never go negative.
                    let decremented = diesel::update(
                        class_offerings::table.filter(
                            class_offerings::id
                                .eq(class_id)
                                .and(class_offerings::seats.gt(0)),
                        ),
                    )
                    .set(class_offerings::seats.eq(class_offerings::seats - 1))
                    .execute(conn)
                    .await?;

                    if decremented == 0 {
                        let known: i64 = class_offerings::table
                            .filter(class_offerings::id.eq(class_id))
                            .count()
                            .get_result(conn)
                            .await?;
                        let refusal = if known == 0 {
                            SettlementRefusal::ClassMissing
                        } else {
                            SettlementRefusal::Overbooked
                        };
                        return Err(TxError::Refused(refusal));
                    }

                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(()) => Ok(SettlementOutcome::settled(Payment {
                id: payment_id,
                booking_id,
                class_id,
                amount: request.amount,
                student_email: request.student_email.clone(),
                recorded_at,
            })),
            Err(TxError::Refused(refusal)) => Ok(SettlementOutcome::refused(refusal)),
            Err(TxError::Diesel(error)) => Err(map_diesel(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let err = map_pool(PoolError::checkout("connection refused"));
        assert!(matches!(err, SettlementStoreError::Connection { .. }));
    }

    #[rstest]
    fn diesel_errors_map_to_transaction_errors() {
        let err = map_diesel(diesel::result::Error::RollbackTransaction);
        assert!(matches!(err, SettlementStoreError::Transaction { .. }));
    }

    #[rstest]
    fn refusals_do_not_surface_as_adapter_errors() {
        let tx_err = TxError::Refused(SettlementRefusal::Overbooked);
        assert!(matches!(
            tx_err,
            TxError::Refused(SettlementRefusal::Overbooked)
        ));
    }
}
