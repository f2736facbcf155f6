//! Helpers wiring handler tests against in-memory stores.

use std::sync::Arc;

use crate::domain::{SettlementService, TokenService};
use crate::test_support::{MemoryStores, StubPaymentProvider};

use super::state::HttpState;

/// Build handler state over fresh, empty in-memory stores.
pub(crate) fn memory_state(tokens: TokenService) -> HttpState {
    let stores = MemoryStores::new();
    let settlement = SettlementService::new(Arc::new(stores.clone()));
    HttpState {
        tokens: Arc::new(tokens),
        directory: Arc::new(stores.clone()),
        catalog: Arc::new(stores.clone()),
        bookings: Arc::new(stores.clone()),
        payments: Arc::new(stores),
        settlement,
        provider: Arc::new(StubPaymentProvider::default()),
    }
}
