//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the domain ports and services, staying testable without I/O. The
//! bundle is constructed once at startup; no module-wide singletons.

use std::sync::Arc;

use crate::domain::ports::{
    BookingStore, CatalogStore, DirectoryStore, PaymentLedger, PaymentProvider,
};
use crate::domain::{SettlementService, TokenService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Identity token issuance and verification.
    pub tokens: Arc<TokenService>,
    /// User directory store.
    pub directory: Arc<dyn DirectoryStore>,
    /// Class offering store.
    pub catalog: Arc<dyn CatalogStore>,
    /// Booking store.
    pub bookings: Arc<dyn BookingStore>,
    /// Payment ledger read side.
    pub payments: Arc<dyn PaymentLedger>,
    /// Settlement service over the transactional store.
    pub settlement: SettlementService,
    /// Payment provider handshake.
    pub provider: Arc<dyn PaymentProvider>,
}
