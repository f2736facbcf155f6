//! Settlement: the one multi-store write with atomicity requirements.
//!
//! A settlement appends a payment, flips the booking from pending to paid,
//! and decrements the class seat count. The storage adapter applies all
//! three inside one transaction; this module owns the request/outcome types
//! and the service that maps refusals onto the error taxonomy, reporting
//! every step individually so callers can see exactly which one refused.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::Error;
use super::payment::Payment;
use super::ports::{SettlementStore, SettlementStoreError};
use super::user::Email;

/// An authenticated payment submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRequest {
    /// The pending booking being settled.
    pub booking_id: Uuid,
    /// The offering whose seat the settlement consumes.
    pub class_id: Uuid,
    /// The paying student, taken from the verified identity.
    pub student_email: Email,
    /// Amount charged.
    pub amount: Decimal,
}

/// Outcome of one settlement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The write committed.
    Applied,
    /// The write ran but a later step aborted the transaction.
    RolledBack,
    /// The conditional write refused to apply.
    Failed,
    /// The step never ran because an earlier one refused.
    Skipped,
}

/// Per-step report for the three settlement writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettlementSteps {
    /// Payment ledger append.
    pub payment_insert: StepStatus,
    /// Booking pending→paid transition.
    pub booking_update: StepStatus,
    /// Class seat decrement.
    pub seat_update: StepStatus,
}

/// Business reasons a settlement refuses to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementRefusal {
    /// No booking with the given id exists.
    BookingMissing,
    /// The booking exists but is not pending; the double-payment guard.
    BookingNotPending,
    /// No offering with the given id exists.
    ClassMissing,
    /// The decrement would take the seat count below zero.
    Overbooked,
}

/// Final verdict of a settlement attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementVerdict {
    /// All three steps committed.
    Settled(Payment),
    /// A conditional step refused; everything rolled back.
    Refused(SettlementRefusal),
}

/// Verdict plus the individual step report.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementOutcome {
    /// Per-step results.
    pub steps: SettlementSteps,
    /// The overall verdict.
    pub verdict: SettlementVerdict,
}

impl SettlementOutcome {
    /// Outcome for a fully committed settlement.
    pub fn settled(payment: Payment) -> Self {
        Self {
            steps: SettlementSteps {
                payment_insert: StepStatus::Applied,
                booking_update: StepStatus::Applied,
                seat_update: StepStatus::Applied,
            },
            verdict: SettlementVerdict::Settled(payment),
        }
    }

    /// Outcome for a refused settlement, with the step report derived from
    /// how far the transaction progressed before the refusal.
    pub fn refused(refusal: SettlementRefusal) -> Self {
        let steps = match refusal {
            SettlementRefusal::BookingMissing | SettlementRefusal::BookingNotPending => {
                SettlementSteps {
                    payment_insert: StepStatus::RolledBack,
                    booking_update: StepStatus::Failed,
                    seat_update: StepStatus::Skipped,
                }
            }
            SettlementRefusal::ClassMissing | SettlementRefusal::Overbooked => SettlementSteps {
                payment_insert: StepStatus::RolledBack,
                booking_update: StepStatus::RolledBack,
                seat_update: StepStatus::Failed,
            },
        };
        Self {
            steps,
            verdict: SettlementVerdict::Refused(refusal),
        }
    }
}

/// Domain service running settlements through the store port.
#[derive(Clone)]
pub struct SettlementService {
    store: Arc<dyn SettlementStore>,
}

impl SettlementService {
    /// Build a service over the given settlement store.
    pub fn new(store: Arc<dyn SettlementStore>) -> Self {
        Self { store }
    }

    /// Validate and run a settlement.
    ///
    /// Refusals come back as taxonomy errors carrying the step report in
    /// `details`; infrastructure failures map to service-unavailable or
    /// internal errors. A refusal never leaves a partial write behind.
    pub async fn settle(&self, request: SettlementRequest) -> Result<SettlementOutcome, Error> {
        if request.amount <= Decimal::ZERO {
            return Err(Error::invalid_request("amount must be positive"));
        }

        let outcome = self
            .store
            .settle(&request)
            .await
            .map_err(map_store_error)?;

        match outcome.verdict {
            SettlementVerdict::Settled(_) => Ok(outcome),
            SettlementVerdict::Refused(refusal) => Err(refusal_error(refusal, outcome.steps)),
        }
    }
}

fn map_store_error(error: SettlementStoreError) -> Error {
    match error {
        SettlementStoreError::Connection { message } => Error::service_unavailable(message),
        SettlementStoreError::Transaction { message } => Error::internal(message),
    }
}

fn refusal_error(refusal: SettlementRefusal, steps: SettlementSteps) -> Error {
    let error = match refusal {
        SettlementRefusal::BookingMissing => Error::not_found("booking not found"),
        SettlementRefusal::BookingNotPending => Error::invalid_state("booking is not pending"),
        SettlementRefusal::ClassMissing => Error::not_found("class offering not found"),
        SettlementRefusal::Overbooked => Error::overbooked("class is fully booked"),
    };
    error.with_details(json!({ "steps": steps }))
}
