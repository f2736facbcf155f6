//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain store ports backed by PostgreSQL
//! via Diesel with async support through `diesel-async` and `bb8` pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: stores only translate between Diesel models and
//!   domain types. No business logic lives here; the one exception is the
//!   settlement adapter, whose transaction shape *is* the atomicity
//!   contract.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) are implementation details, never exposed to the domain.
//! - **Strongly typed errors**: database failures map onto the per-port
//!   error enums.

mod diesel_booking_store;
mod diesel_catalog_store;
mod diesel_directory_store;
mod diesel_payment_ledger;
mod diesel_settlement_store;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_booking_store::DieselBookingStore;
pub use diesel_catalog_store::DieselCatalogStore;
pub use diesel_directory_store::DieselDirectoryStore;
pub use diesel_payment_ledger::DieselPaymentLedger;
pub use diesel_settlement_store::DieselSettlementStore;
pub use pool::{DbPool, PoolConfig, PoolError};
