//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: every HTTP endpoint from the inbound layer, the shared
//! schemas, and the bearer-token security scheme. Swagger UI serves the
//! document in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    Booking, BookingStatus, ClassOffering, Email, ErrorCode, OfferingStatus, Payment, Role,
    SettlementSteps, StepStatus, User,
};
use crate::inbound::http::bookings::BookingRequest;
use crate::inbound::http::classes::{ReviewRequest, ReviewVerdict, SubmitClassRequest};
use crate::inbound::http::error::ApiError;
use crate::inbound::http::payments::{
    IntentRequest, IntentResponse, SettleRequest, SettleResponse,
};
use crate::inbound::http::users::{PromoteRequest, RegisterRequest, RegisterResponse, RoleResponse};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some(
                        "Signed identity token; send as `Authorization: Bearer <token>`.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Coursedesk backend API",
        description = "HTTP interface for the course-booking platform: registration, \
            role-gated catalogue management, bookings, and payment settlement."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_role,
        crate::inbound::http::users::promote,
        crate::inbound::http::users::remove,
        crate::inbound::http::classes::submit,
        crate::inbound::http::classes::list_approved,
        crate::inbound::http::classes::list_all,
        crate::inbound::http::classes::list_mine,
        crate::inbound::http::classes::review,
        crate::inbound::http::bookings::place,
        crate::inbound::http::bookings::list_mine,
        crate::inbound::http::bookings::remove,
        crate::inbound::http::payments::create_intent,
        crate::inbound::http::payments::settle,
        crate::inbound::http::payments::history,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        Email,
        Role,
        User,
        OfferingStatus,
        ClassOffering,
        BookingStatus,
        Booking,
        Payment,
        StepStatus,
        SettlementSteps,
        RegisterRequest,
        RegisterResponse,
        RoleResponse,
        PromoteRequest,
        SubmitClassRequest,
        ReviewVerdict,
        ReviewRequest,
        BookingRequest,
        IntentRequest,
        IntentResponse,
        SettleRequest,
        SettleResponse,
    )),
    tags(
        (name = "users", description = "Registration and directory management"),
        (name = "classes", description = "Catalogue submission, browsing, and review"),
        (name = "bookings", description = "Seat bookings"),
        (name = "payments", description = "Intents, settlement, and history"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
