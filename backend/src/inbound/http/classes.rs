//! Catalogue API handlers: submission, browsing, and admin review.
//!
//! ```text
//! POST  /api/v1/classes                      instructor: submit for review
//! GET   /api/v1/classes                      public: approved offerings
//! GET   /api/v1/classes/all                  admin: every offering
//! GET   /api/v1/instructors/{email}/classes  instructor + self: own offerings
//! PATCH /api/v1/classes/{id}/review          admin: approve or deny
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{CatalogError, ReviewDecision};
use crate::domain::{ClassOffering, Email, Error, OfferingStatus, Role, require_role, require_self};

use super::bearer::BearerIdentity;
use super::error::{ApiError, ApiResult};
use super::state::HttpState;

/// Instructor submission body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClassRequest {
    /// Display name shown to students.
    #[schema(example = "Intro to Sketching")]
    pub name: String,
    /// Initial seat capacity.
    #[schema(example = 12)]
    pub seats: i32,
    /// Price per seat.
    #[schema(value_type = String, example = "49.99")]
    pub price: Decimal,
}

/// Admin review verdict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewVerdict {
    /// Make the offering visible and bookable.
    Approved,
    /// Reject the offering.
    Denied,
}

/// Admin review body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// The verdict to apply.
    pub status: ReviewVerdict,
    /// Feedback for the instructor; persisted only on denial.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl From<ReviewRequest> for ReviewDecision {
    fn from(value: ReviewRequest) -> Self {
        match value.status {
            ReviewVerdict::Approved => Self::Approve,
            ReviewVerdict::Denied => Self::Deny {
                feedback: value.feedback,
            },
        }
    }
}

pub(super) fn map_catalog_error(error: CatalogError) -> ApiError {
    let domain = match error {
        CatalogError::NotFound => Error::not_found("class offering not found"),
        CatalogError::Connection { message } => Error::service_unavailable(message),
        CatalogError::Query { message } => Error::internal(message),
    };
    domain.into()
}

/// Submit an offering for review. Instructor only; lands pending.
#[utoipa::path(
    post,
    path = "/api/v1/classes",
    request_body = SubmitClassRequest,
    responses(
        (status = 201, description = "Offering submitted", body = ClassOffering),
        (status = 400, description = "Invalid submission", body = ApiError),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    tags = ["classes"],
    operation_id = "submitClass"
)]
#[post("/classes")]
pub async fn submit(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    payload: web::Json<SubmitClassRequest>,
) -> ApiResult<HttpResponse> {
    let instructor =
        require_role(state.directory.as_ref(), bearer.identity(), Role::Instructor).await?;

    let body = payload.into_inner();
    let offering = ClassOffering::submit(instructor.email, body.name, body.seats, body.price)
        .map_err(|err| ApiError::from(Error::invalid_request(err.to_string())))?;

    state
        .catalog
        .insert(&offering)
        .await
        .map_err(map_catalog_error)?;
    Ok(HttpResponse::Created().json(offering))
}

/// Browse approved offerings. Public.
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    responses(
        (status = 200, description = "Approved offerings", body = [ClassOffering])
    ),
    tags = ["classes"],
    operation_id = "listApprovedClasses",
    security([])
)]
#[get("/classes")]
pub async fn list_approved(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ClassOffering>>> {
    let offerings = state
        .catalog
        .list_by_status(OfferingStatus::Approved)
        .await
        .map_err(map_catalog_error)?;
    Ok(web::Json(offerings))
}

/// List every offering regardless of state. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/classes/all",
    responses(
        (status = 200, description = "All offerings", body = [ClassOffering]),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    tags = ["classes"],
    operation_id = "listAllClasses"
)]
#[get("/classes/all")]
pub async fn list_all(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
) -> ApiResult<web::Json<Vec<ClassOffering>>> {
    require_role(state.directory.as_ref(), bearer.identity(), Role::Admin).await?;

    let offerings = state.catalog.list_all().await.map_err(map_catalog_error)?;
    Ok(web::Json(offerings))
}

/// List an instructor's own offerings. The path email must match the token.
#[utoipa::path(
    get,
    path = "/api/v1/instructors/{email}/classes",
    params(("email" = String, Path, description = "Instructor address")),
    responses(
        (status = 200, description = "Own offerings", body = [ClassOffering]),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    tags = ["classes"],
    operation_id = "listInstructorClasses"
)]
#[get("/instructors/{email}/classes")]
pub async fn list_mine(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ClassOffering>>> {
    let email = Email::new(path.into_inner())
        .map_err(|err| ApiError::from(Error::invalid_request(err.to_string())))?;
    require_role(state.directory.as_ref(), bearer.identity(), Role::Instructor).await?;
    require_self(bearer.identity(), &email)?;

    let offerings = state
        .catalog
        .list_by_owner(&email)
        .await
        .map_err(map_catalog_error)?;
    Ok(web::Json(offerings))
}

/// Apply a review verdict. Admin only; approval clears feedback.
#[utoipa::path(
    patch,
    path = "/api/v1/classes/{id}/review",
    params(("id" = Uuid, Path, description = "Offering id")),
    request_body = ReviewRequest,
    responses(
        (status = 204, description = "Verdict applied"),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Unknown offering", body = ApiError)
    ),
    tags = ["classes"],
    operation_id = "reviewClass"
)]
#[patch("/classes/{id}/review")]
pub async fn review(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    path: web::Path<Uuid>,
    payload: web::Json<ReviewRequest>,
) -> ApiResult<HttpResponse> {
    require_role(state.directory.as_ref(), bearer.identity(), Role::Admin).await?;

    let decision = ReviewDecision::from(payload.into_inner());
    state
        .catalog
        .review(path.into_inner(), &decision)
        .await
        .map_err(map_catalog_error)?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    //! Review verdict conversion.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn approval_discards_feedback() {
        let decision = ReviewDecision::from(ReviewRequest {
            status: ReviewVerdict::Approved,
            feedback: Some("ignored".to_owned()),
        });
        assert_eq!(decision.feedback(), None);
        assert_eq!(decision.status(), OfferingStatus::Approved);
    }

    #[rstest]
    fn denial_carries_feedback() {
        let decision = ReviewDecision::from(ReviewRequest {
            status: ReviewVerdict::Denied,
            feedback: Some("needs a syllabus".to_owned()),
        });
        assert_eq!(decision.feedback(), Some("needs a syllabus"));
        assert_eq!(decision.status(), OfferingStatus::Denied);
    }
}
