//! Directory API handlers: registration, role lookup, promotion, removal.
//!
//! ```text
//! POST   /api/v1/users                  register (idempotent by email)
//! GET    /api/v1/users                  admin: list directory
//! GET    /api/v1/users/{email}/role     self: current role
//! PATCH  /api/v1/users/{id}/role        admin: promote
//! DELETE /api/v1/users/{id}             admin: remove
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{DirectoryError, RegistrationOutcome};
use crate::domain::{Email, Error, Role, User, require_role, require_self};

use super::bearer::BearerIdentity;
use super::error::{ApiError, ApiResult};
use super::state::HttpState;

/// Registration request body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Address to register; normalised before storage.
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Registration response; duplicates are informational, not errors.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Whether a new directory record was created.
    pub created: bool,
    /// Outcome description.
    pub message: String,
    /// The created record, absent for duplicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Role lookup response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    /// The queried address.
    pub email: Email,
    /// Current persisted role.
    pub role: Role,
}

/// Promotion request body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    /// Role to assign.
    pub role: Role,
}

fn map_directory_error(error: DirectoryError) -> ApiError {
    let domain = match error {
        DirectoryError::NotFound => Error::not_found("user record not found"),
        DirectoryError::Connection { message } => Error::service_unavailable(message),
        DirectoryError::Query { message } => Error::internal(message),
    };
    domain.into()
}

fn invalid_email(err: crate::domain::EmailValidationError) -> ApiError {
    Error::invalid_request(err.to_string()).into()
}

/// Register a user. Idempotent on email: a duplicate reports back without
/// mutating the existing record.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Created, or already present", body = RegisterResponse),
        (status = 400, description = "Invalid email", body = ApiError),
        (status = 503, description = "Directory unavailable", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<web::Json<RegisterResponse>> {
    let email = Email::new(&payload.email).map_err(invalid_email)?;
    let candidate = User::register(email);

    let outcome = state
        .directory
        .insert_if_absent(&candidate)
        .await
        .map_err(map_directory_error)?;

    let response = match outcome {
        RegistrationOutcome::Created(user) => RegisterResponse {
            created: true,
            message: "registration complete".to_owned(),
            user: Some(user),
        },
        RegistrationOutcome::AlreadyExists => RegisterResponse {
            created: false,
            message: "account already exists".to_owned(),
            user: None,
        },
    };
    Ok(web::Json(response))
}

/// List every directory record. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Directory records", body = [User]),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
) -> ApiResult<web::Json<Vec<User>>> {
    require_role(state.directory.as_ref(), bearer.identity(), Role::Admin).await?;

    let users = state.directory.list().await.map_err(map_directory_error)?;
    Ok(web::Json(users))
}

/// Look up the caller's own role. The path email must match the token.
#[utoipa::path(
    get,
    path = "/api/v1/users/{email}/role",
    params(("email" = String, Path, description = "Address to query")),
    responses(
        (status = 200, description = "Current role", body = RoleResponse),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Unknown user", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "getUserRole"
)]
#[get("/users/{email}/role")]
pub async fn get_role(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<RoleResponse>> {
    let email = Email::new(path.into_inner()).map_err(invalid_email)?;
    require_self(bearer.identity(), &email)?;

    let user = state
        .directory
        .find_by_email(&email)
        .await
        .map_err(map_directory_error)?
        .ok_or_else(|| ApiError::from(Error::not_found("user record not found")))?;

    Ok(web::Json(RoleResponse {
        email: user.email,
        role: user.role,
    }))
}

/// Assign a role. Admin only; takes effect on the target's next request.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/role",
    params(("id" = Uuid, Path, description = "Directory record id")),
    request_body = PromoteRequest,
    responses(
        (status = 204, description = "Role updated"),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Unknown user", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "promoteUser"
)]
#[patch("/users/{id}/role")]
pub async fn promote(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    path: web::Path<Uuid>,
    payload: web::Json<PromoteRequest>,
) -> ApiResult<HttpResponse> {
    require_role(state.directory.as_ref(), bearer.identity(), Role::Admin).await?;

    state
        .directory
        .set_role(path.into_inner(), payload.role)
        .await
        .map_err(map_directory_error)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Remove a directory record. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "Directory record id")),
    responses(
        (status = 204, description = "Record removed"),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Unknown user", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn remove(
    state: web::Data<HttpState>,
    bearer: BearerIdentity,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_role(state.directory.as_ref(), bearer.identity(), Role::Admin).await?;

    state
        .directory
        .delete(path.into_inner())
        .await
        .map_err(map_directory_error)?;
    Ok(HttpResponse::NoContent().finish())
}
