//! Payment ledger entries.
//!
//! The ledger is append-only: rows are written exclusively by the settlement
//! transaction and never updated or deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::Email;

/// One settled payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Primary identifier.
    pub id: Uuid,
    /// The booking this payment settled.
    pub booking_id: Uuid,
    /// The offering whose seat the settlement consumed.
    pub class_id: Uuid,
    /// Amount charged.
    #[schema(value_type = String, example = "49.99")]
    pub amount: Decimal,
    /// The paying student.
    pub student_email: Email,
    /// When the settlement committed.
    pub recorded_at: DateTime<Utc>,
}
