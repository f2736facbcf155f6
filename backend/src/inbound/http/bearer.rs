//! Bearer token extraction and verification.
//!
//! Implements the `Authorization: Bearer <token>` convention as an Actix
//! extractor, so identity verification runs strictly before any handler
//! body. Missing, malformed, badly signed, and expired tokens all collapse
//! into the same 401 envelope; the guard never reaches a store.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};

use crate::domain::{Error, Identity};

use super::error::ApiError;
use super::state::HttpState;

/// Stable message for every 401 envelope.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized Access";

/// A verified request identity, extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct BearerIdentity(Identity);

impl BearerIdentity {
    /// Borrow the verified identity.
    pub fn identity(&self) -> &Identity {
        &self.0
    }

    /// Consume the extractor, yielding the verified identity.
    pub fn into_identity(self) -> Identity {
        self.0
    }
}

fn unauthorized() -> ApiError {
    Error::unauthenticated(UNAUTHORIZED_MESSAGE).into()
}

fn verify_request(req: &HttpRequest) -> Result<BearerIdentity, ApiError> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| ApiError::from(Error::internal("token service not configured")))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(unauthorized)?
        .to_str()
        .map_err(|_| unauthorized())?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(unauthorized)?;

    let claims = state.tokens.verify(token).map_err(|_| unauthorized())?;
    Ok(BearerIdentity(Identity::from(claims)))
}

impl FromRequest for BearerIdentity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(verify_request(req))
    }
}
