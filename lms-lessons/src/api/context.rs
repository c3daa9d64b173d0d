//! Per-request identity context
//!
//! The upstream gateway authenticates the session and forwards validated
//! identity as headers; this extractor turns them into explicit arguments
//! for the core. Tenant id is mandatory on every request. User id and role
//! are optional together: absent means an anonymous caller.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use lms_common::auth::{Caller, Role};
use uuid::Uuid;

use crate::error::ApiError;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-user-role";

/// Identity scope of one request
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub tenant_id: Uuid,
    pub caller: Caller,
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_raw = header(parts, TENANT_HEADER)
            .ok_or_else(|| ApiError::BadRequest(format!("Missing {} header", TENANT_HEADER)))?;
        let tenant_id = Uuid::parse_str(tenant_raw)
            .map_err(|_| ApiError::BadRequest(format!("Malformed {} header", TENANT_HEADER)))?;

        let caller = match header(parts, USER_HEADER) {
            None => Caller::Anonymous,
            Some(user_raw) => {
                let user_id = Uuid::parse_str(user_raw)
                    .map_err(|_| ApiError::BadRequest(format!("Malformed {} header", USER_HEADER)))?;
                let role: Role = header(parts, ROLE_HEADER)
                    .unwrap_or("learner")
                    .parse()
                    .map_err(|e: lms_common::Error| ApiError::BadRequest(e.to_string()))?;
                Caller::authenticated(user_id, role)
            }
        };

        Ok(RequestContext { tenant_id, caller })
    }
}
