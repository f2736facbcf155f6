//! Booking API handlers.
//!
//! ```text
//! POST   /api/v1/bookings                    student: book a seat
//! GET    /api/v1/students/{email}/bookings   student + self: own bookings
//! DELETE /api/v1/bookings/{id}               owning student, pending only
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{BookingError, DeletePendingOutcome};
use crate::domain::{
    Booking, Email, Error, FORBIDDEN_MESSAGE, OfferingStatus, Role, require_role, require_self,
};

use super::bearer::BearerIdentity;
use super::classes;
use super::error::{ApiError, ApiResult};
use super::state::HttpState;

/// Booking request body. The student is the verified identity, never a
/// body field.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// The offering to book.
    pub class_id: Uuid,
}

fn map_booking_error(error: BookingError) -> ApiError {
    let domain = match error {
        BookingError::Connection { message } => Error::service_unavailable(message),
        BookingError::Query { message } => Error::internal(message),
    };
    domain.into()
}

/// Book one seat of an approved offering. Student only.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking placed", body = Booking),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Unknown offering", body = ApiError),
        (status = 409, description = "Offering is not approved", body = ApiError)
    ),
    tags = ["bookings"],
    operation_id = "placeBooking"
)]
#[post("/bookings")]
pub async fn place(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    payload: web::Json<BookingRequest>,
) -> ApiResult<HttpResponse> {
    let student =
        require_role(state.directory.as_ref(), bearer.identity(), Role::Student).await?;

    let class_id = payload.class_id;
    let offering = state
        .catalog
        .find_by_id(class_id)
        .await
        .map_err(classes::map_catalog_error)?
        .ok_or_else(|| ApiError::from(Error::not_found("class offering not found")))?;

    if offering.status != OfferingStatus::Approved {
        return Err(Error::invalid_state("class offering is not approved").into());
    }

    let booking = Booking::place(student.email, class_id);
    state
        .bookings
        .insert(&booking)
        .await
        .map_err(map_booking_error)?;
    Ok(HttpResponse::Created().json(booking))
}

/// List a student's own bookings. The path email must match the token.
#[utoipa::path(
    get,
    path = "/api/v1/students/{email}/bookings",
    params(("email" = String, Path, description = "Student address")),
    responses(
        (status = 200, description = "Own bookings", body = [Booking]),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    tags = ["bookings"],
    operation_id = "listStudentBookings"
)]
#[get("/students/{email}/bookings")]
pub async fn list_mine(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Booking>>> {
    let email = Email::new(path.into_inner())
        .map_err(|err| ApiError::from(Error::invalid_request(err.to_string())))?;
    require_role(state.directory.as_ref(), bearer.identity(), Role::Student).await?;
    require_self(bearer.identity(), &email)?;

    let bookings = state
        .bookings
        .list_by_student(&email)
        .await
        .map_err(map_booking_error)?;
    Ok(web::Json(bookings))
}

/// Delete a pending booking. Only the owning student may remove it, and
/// only while it has not settled.
#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking id")),
    responses(
        (status = 204, description = "Booking removed"),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Not the owner", body = ApiError),
        (status = 404, description = "Unknown booking", body = ApiError),
        (status = 409, description = "Booking already settled", body = ApiError)
    ),
    tags = ["bookings"],
    operation_id = "deleteBooking"
)]
#[delete("/bookings/{id}")]
pub async fn remove(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_role(state.directory.as_ref(), bearer.identity(), Role::Student).await?;

    let outcome = state
        .bookings
        .delete_pending(path.into_inner(), bearer.identity().email())
        .await
        .map_err(map_booking_error)?;

    match outcome {
        DeletePendingOutcome::Deleted => Ok(HttpResponse::NoContent().finish()),
        DeletePendingOutcome::Missing => Err(Error::not_found("booking not found").into()),
        DeletePendingOutcome::NotOwner => Err(Error::forbidden(FORBIDDEN_MESSAGE).into()),
        DeletePendingOutcome::NotPending => {
            Err(Error::invalid_state("booking is not pending").into())
        }
    }
}
