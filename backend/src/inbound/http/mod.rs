//! HTTP driving adapters.
//!
//! Handlers translate between the wire format and the domain: parse and
//! validate payloads, run the guard pipeline (token verification in the
//! [`bearer::BearerIdentity`] extractor, then role/self checks), call the
//! ports, and map domain errors into the JSON envelope.

pub mod bearer;
pub mod bookings;
pub mod classes;
pub mod error;
pub mod health;
pub mod payments;
pub mod state;
#[cfg(test)]
pub(crate) mod test_support;
pub mod users;

pub use error::{ApiError, ApiResult};
