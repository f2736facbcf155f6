//! Server construction and route wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use coursedesk_backend::doc::ApiDoc;
use coursedesk_backend::domain::{SettlementService, TokenService};
use coursedesk_backend::inbound::http::health::{HealthState, live, ready};
use coursedesk_backend::inbound::http::state::HttpState;
use coursedesk_backend::inbound::http::{bookings, classes, payments, users};
use coursedesk_backend::outbound::persistence::{
    DieselBookingStore, DieselCatalogStore, DieselDirectoryStore, DieselPaymentLedger,
    DieselSettlementStore,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Wire Diesel-backed stores and the token service into handler state,
/// consuming the configuration.
fn build_http_state(config: ServerConfig) -> (HttpState, std::net::SocketAddr) {
    let ServerConfig {
        bind_addr,
        signing_key,
        db_pool,
        provider,
    } = config;

    let settlement = SettlementService::new(Arc::new(DieselSettlementStore::new(db_pool.clone())));
    let state = HttpState {
        tokens: Arc::new(TokenService::new(signing_key)),
        directory: Arc::new(DieselDirectoryStore::new(db_pool.clone())),
        catalog: Arc::new(DieselCatalogStore::new(db_pool.clone())),
        bookings: Arc::new(DieselBookingStore::new(db_pool.clone())),
        payments: Arc::new(DieselPaymentLedger::new(db_pool)),
        settlement,
        provider,
    };
    (state, bind_addr)
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

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

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let (http_state, bind_addr) = build_http_state(config);
    let http_state = web::Data::new(http_state);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
