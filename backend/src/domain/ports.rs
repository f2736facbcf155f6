//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the document stores and the payment provider). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants instead of returning `anyhow::Result`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::booking::Booking;
use super::catalog::{ClassOffering, OfferingStatus};
use super::payment::Payment;
use super::settlement::{SettlementOutcome, SettlementRequest};
use super::user::{Email, Role, User};

/// Persistence errors raised by [`DirectoryStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The referenced user id does not exist.
    #[error("user record not found")]
    NotFound,
    /// Repository connection could not be established.
    #[error("directory connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("directory query failed: {message}")]
    Query {
        /// Adapter-supplied description.
        message: String,
    },
}

impl DirectoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Result of an idempotent registration attempt.
///
/// Duplicate registration is an informational outcome, not an error: the
/// existing record is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A new directory record was created.
    Created(User),
    /// A record with this email already existed; nothing was mutated.
    AlreadyExists,
}

/// Persistence port for the user directory.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Insert the record unless its email is already present.
    async fn insert_if_absent(&self, user: &User) -> Result<RegistrationOutcome, DirectoryError>;

    /// Fetch a record by its normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DirectoryError>;

    /// Replace the persisted role. Fails with [`DirectoryError::NotFound`]
    /// when the id is absent.
    async fn set_role(&self, id: Uuid, role: Role) -> Result<(), DirectoryError>;

    /// Remove a record. Fails with [`DirectoryError::NotFound`] when absent.
    async fn delete(&self, id: Uuid) -> Result<(), DirectoryError>;

    /// All directory records; ordering is unspecified.
    async fn list(&self) -> Result<Vec<User>, DirectoryError>;
}

/// Persistence errors raised by [`CatalogStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The referenced offering id does not exist.
    #[error("class offering not found")]
    NotFound,
    /// Repository connection could not be established.
    #[error("catalogue connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("catalogue query failed: {message}")]
    Query {
        /// Adapter-supplied description.
        message: String,
    },
}

impl CatalogError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Admin verdict on a pending offering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Make the offering visible and bookable.
    Approve,
    /// Reject the offering, optionally explaining why.
    Deny {
        /// Feedback surfaced to the submitting instructor.
        feedback: Option<String>,
    },
}

impl ReviewDecision {
    /// The status this decision writes.
    pub fn status(&self) -> OfferingStatus {
        match self {
            Self::Approve => OfferingStatus::Approved,
            Self::Deny { .. } => OfferingStatus::Denied,
        }
    }

    /// The feedback this decision writes, cleared on approval.
    pub fn feedback(&self) -> Option<&str> {
        match self {
            Self::Approve => None,
            Self::Deny { feedback } => feedback.as_deref(),
        }
    }
}

/// Persistence port for class offerings.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Persist a freshly submitted offering.
    async fn insert(&self, offering: &ClassOffering) -> Result<(), CatalogError>;

    /// Fetch an offering by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ClassOffering>, CatalogError>;

    /// Apply an admin review verdict. Fails with [`CatalogError::NotFound`]
    /// when the id is absent.
    async fn review(&self, id: Uuid, decision: &ReviewDecision) -> Result<(), CatalogError>;

    /// Offerings in the given review state; ordering is unspecified.
    async fn list_by_status(&self, status: OfferingStatus)
    -> Result<Vec<ClassOffering>, CatalogError>;

    /// Every offering regardless of state; ordering is unspecified.
    async fn list_all(&self) -> Result<Vec<ClassOffering>, CatalogError>;

    /// Offerings submitted by one instructor; ordering is unspecified.
    async fn list_by_owner(&self, owner: &Email) -> Result<Vec<ClassOffering>, CatalogError>;
}

/// Persistence errors raised by [`BookingStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    /// Repository connection could not be established.
    #[error("booking store connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("booking store query failed: {message}")]
    Query {
        /// Adapter-supplied description.
        message: String,
    },
}

impl BookingError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Result of a conditional pending-booking deletion.
///
/// The adapter resolves the refusal reason so callers can map it onto the
/// error taxonomy without a second round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePendingOutcome {
    /// The pending booking was removed.
    Deleted,
    /// No booking with that id exists.
    Missing,
    /// The booking belongs to a different student.
    NotOwner,
    /// The booking has already been settled.
    NotPending,
}

/// Persistence port for bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Persist a freshly placed booking.
    async fn insert(&self, booking: &Booking) -> Result<(), BookingError>;

    /// Fetch a booking by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError>;

    /// Bookings placed by one student; ordering is unspecified.
    async fn list_by_student(&self, student: &Email) -> Result<Vec<Booking>, BookingError>;

    /// Delete a booking only while it is pending and owned by `student`.
    async fn delete_pending(
        &self,
        id: Uuid,
        student: &Email,
    ) -> Result<DeletePendingOutcome, BookingError>;
}

/// Persistence errors raised by [`PaymentLedger`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentLedgerError {
    /// Repository connection could not be established.
    #[error("payment ledger connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// Query failed during execution.
    #[error("payment ledger query failed: {message}")]
    Query {
        /// Adapter-supplied description.
        message: String,
    },
}

impl PaymentLedgerError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Read port for the append-only payment ledger.
///
/// Writes happen exclusively through [`SettlementStore::settle`].
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Payments recorded for one student, matched on the student email
    /// column; ordering is unspecified.
    async fn list_by_student(&self, student: &Email) -> Result<Vec<Payment>, PaymentLedgerError>;
}

/// Infrastructure errors raised by [`SettlementStore`] adapters.
///
/// Business refusals (double payment, exhausted seats) are not errors at
/// this port; they travel inside [`SettlementOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementStoreError {
    /// Repository connection could not be established.
    #[error("settlement store connection failed: {message}")]
    Connection {
        /// Adapter-supplied description.
        message: String,
    },
    /// A statement inside the transaction failed for non-business reasons.
    #[error("settlement transaction failed: {message}")]
    Transaction {
        /// Adapter-supplied description.
        message: String,
    },
}

impl SettlementStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for transaction failures.
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
        }
    }
}

/// Port for the atomic settlement transaction.
///
/// Implementations MUST apply the payment insert, the pending→paid booking
/// transition, and the seat decrement as one atomic unit relative to
/// concurrent settlements against the same booking or class: both
/// conditional writes are single check-then-set statements, and a refused
/// step rolls the payment insert back.
#[async_trait]
pub trait SettlementStore: Send + Sync {
    /// Run the settlement transaction.
    async fn settle(
        &self,
        request: &SettlementRequest,
    ) -> Result<SettlementOutcome, SettlementStoreError>;
}

/// Errors raised by [`PaymentProvider`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentProviderError {
    /// The provider endpoint was unreachable or timed out.
    #[error("payment provider unreachable: {message}")]
    Transport {
        /// Adapter-supplied description.
        message: String,
    },
    /// The provider answered with a non-success status.
    #[error("payment provider rejected the request: {message}")]
    Rejected {
        /// Adapter-supplied description.
        message: String,
    },
    /// The provider response could not be decoded.
    #[error("payment provider response invalid: {message}")]
    Decode {
        /// Adapter-supplied description.
        message: String,
    },
}

impl PaymentProviderError {
    /// Helper for transport failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for provider rejections.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Helper for undecodable responses.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Client secret handed back to the browser to confirm a payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Provider-issued confirmation handle.
    pub client_secret: String,
}

/// Outbound port for the payment provider handshake.
///
/// Intent creation is the only provider call the core makes; settlement
/// itself is local ledger bookkeeping.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Ask the provider to open an intent for the given amount.
    async fn create_intent(
        &self,
        amount: Decimal,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentProviderError>;
}
