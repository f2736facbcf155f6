//! Shared wiring for HTTP integration tests: in-memory stores behind the
//! real handler set.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use uuid::Uuid;

use coursedesk_backend::domain::{Email, Role, SettlementService, SigningKey, TokenService};
use coursedesk_backend::inbound::http::state::HttpState;
use coursedesk_backend::inbound::http::{bookings, classes, payments, users};
use coursedesk_backend::test_support::{MemoryStores, StubPaymentProvider};

const SIGNING_KEY: &[u8] = b"integration-test-key";

/// One backend instance: shared stores plus wired handler state.
pub struct TestBackend {
    pub stores: MemoryStores,
    pub state: HttpState,
}

impl TestBackend {
    /// Fresh backend over empty stores.
    pub fn new() -> Self {
        let stores = MemoryStores::new();
        let tokens =
            TokenService::new(SigningKey::from_bytes(SIGNING_KEY.to_vec()).expect("non-empty key"));
        let settlement = SettlementService::new(Arc::new(stores.clone()));
        let state = HttpState {
            tokens: Arc::new(tokens),
            directory: Arc::new(stores.clone()),
            catalog: Arc::new(stores.clone()),
            bookings: Arc::new(stores.clone()),
            payments: Arc::new(stores.clone()),
            settlement,
            provider: Arc::new(StubPaymentProvider::default()),
        };
        Self { stores, state }
    }

    /// Parse a test address.
    pub fn email(raw: &str) -> Email {
        Email::new(raw).expect("valid test email")
    }

    /// Seed a directory record with the given role, returning its id.
    pub fn seed_role(&self, email: &str, role: Role) -> Uuid {
        self.stores.seed_user(&Self::email(email), role)
    }

    /// Authorization header for a freshly issued token.
    pub fn bearer_for(&self, email: &str) -> (&'static str, String) {
        let token = self.state.tokens.issue(&Self::email(email));
        ("Authorization", format!("Bearer {token}"))
    }

    /// The full API surface under `/api/v1`, backed by this instance.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let api = web::scope("/api/v1")
            .service(users::register)
            .service(users::list_users)
            .service(users::get_role)
            .service(users::promote)
            .service(users::remove)
            .service(classes::submit)
            .service(classes::list_all)
            .service(classes::list_approved)
            .service(classes::list_mine)
            .service(classes::review)
            .service(bookings::place)
            .service(bookings::list_mine)
            .service(bookings::remove)
            .service(payments::create_intent)
            .service(payments::settle)
            .service(payments::history);

        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .service(api)
    }
}
