//! Payment API handlers: the provider handshake, settlement, and history.
//!
//! ```text
//! POST /api/v1/payments/intent              student: open a provider intent
//! POST /api/v1/payments                     student: settle a booking
//! GET  /api/v1/students/{email}/payments    student + self: payment history
//! ```

use actix_web::{HttpResponse, get, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{PaymentLedgerError, PaymentProviderError};
use crate::domain::{
    Email, Error, Payment, Role, SettlementRequest, SettlementSteps, SettlementVerdict,
    require_role, require_self,
};

use super::bearer::BearerIdentity;
use super::error::{ApiError, ApiResult};
use super::state::HttpState;

/// Currency charged for every intent; prices are quoted in it platform-wide.
const CURRENCY: &str = "usd";

/// Intent request body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    /// Amount to charge.
    #[schema(value_type = String, example = "49.99")]
    pub amount: Decimal,
}

/// Intent response handed back to the browser.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    /// Provider-issued confirmation handle.
    pub client_secret: String,
}

/// Settlement request body. The student is the verified identity.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleRequest {
    /// The pending booking to settle.
    pub booking_id: Uuid,
    /// The booked offering.
    pub class_id: Uuid,
    /// Amount charged.
    #[schema(value_type = String, example = "49.99")]
    pub amount: Decimal,
}

/// Settlement response: the per-step report plus the ledger entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    /// Outcome of each of the three writes.
    pub steps: SettlementSteps,
    /// The appended payment.
    pub payment: Payment,
}

fn map_provider_error(error: PaymentProviderError) -> ApiError {
    let domain = match error {
        PaymentProviderError::Transport { message } => Error::service_unavailable(message),
        PaymentProviderError::Rejected { message } => Error::invalid_request(message),
        PaymentProviderError::Decode { message } => Error::internal(message),
    };
    domain.into()
}

fn map_ledger_error(error: PaymentLedgerError) -> ApiError {
    let domain = match error {
        PaymentLedgerError::Connection { message } => Error::service_unavailable(message),
        PaymentLedgerError::Query { message } => Error::internal(message),
    };
    domain.into()
}

/// Open a payment intent with the provider. Student only.
#[utoipa::path(
    post,
    path = "/api/v1/payments/intent",
    request_body = IntentRequest,
    responses(
        (status = 200, description = "Intent opened", body = IntentResponse),
        (status = 400, description = "Invalid amount or provider rejection", body = ApiError),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 503, description = "Provider unreachable", body = ApiError)
    ),
    tags = ["payments"],
    operation_id = "createPaymentIntent"
)]
#[post("/payments/intent")]
pub async fn create_intent(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    payload: web::Json<IntentRequest>,
) -> ApiResult<web::Json<IntentResponse>> {
    require_role(state.directory.as_ref(), bearer.identity(), Role::Student).await?;

    if payload.amount <= Decimal::ZERO {
        return Err(Error::invalid_request("amount must be positive").into());
    }

    let intent = state
        .provider
        .create_intent(payload.amount, CURRENCY)
        .await
        .map_err(map_provider_error)?;
    Ok(web::Json(IntentResponse {
        client_secret: intent.client_secret,
    }))
}

/// Settle a booking after the provider confirms client-side. Student only.
///
/// The three writes are atomic: a refused step rolls everything back and the
/// error envelope carries the per-step report in `details`.
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = SettleRequest,
    responses(
        (status = 200, description = "Settled", body = SettleResponse),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Unknown booking or offering", body = ApiError),
        (status = 409, description = "Not pending, or fully booked", body = ApiError)
    ),
    tags = ["payments"],
    operation_id = "settlePayment"
)]
#[post("/payments")]
pub async fn settle(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    payload: web::Json<SettleRequest>,
) -> ApiResult<HttpResponse> {
    let student =
        require_role(state.directory.as_ref(), bearer.identity(), Role::Student).await?;

    let body = payload.into_inner();
    let outcome = state
        .settlement
        .settle(SettlementRequest {
            booking_id: body.booking_id,
            class_id: body.class_id,
            student_email: student.email,
            amount: body.amount,
        })
        .await?;

    match outcome.verdict {
        SettlementVerdict::Settled(payment) => Ok(HttpResponse::Ok().json(SettleResponse {
            steps: outcome.steps,
            payment,
        })),
        // The service converts refusals into errors; reaching this arm
        // means the store broke that contract.
        SettlementVerdict::Refused(_) => {
            Err(Error::internal("refused settlement escaped the service").into())
        }
    }
}

/// List a student's own payments. The path email must match the token.
#[utoipa::path(
    get,
    path = "/api/v1/students/{email}/payments",
    params(("email" = String, Path, description = "Student address")),
    responses(
        (status = 200, description = "Payment history", body = [Payment]),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    tags = ["payments"],
    operation_id = "listStudentPayments"
)]
#[get("/students/{email}/payments")]
pub async fn history(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Payment>>> {
    let email = Email::new(path.into_inner())
        .map_err(|err| ApiError::from(Error::invalid_request(err.to_string())))?;
    require_role(state.directory.as_ref(), bearer.identity(), Role::Student).await?;
    require_self(bearer.identity(), &email)?;

    let payments = state
        .payments
        .list_by_student(&email)
        .await
        .map_err(map_ledger_error)?;
    Ok(web::Json(payments))
}
