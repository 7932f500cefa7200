//! Session resolution at the HTTP edge.
//!
//! The identity-provider handshake happens upstream; by the time a request
//! reaches this server the authenticated identity is carried in headers.
//! The core only ever consumes the user id (to scope orders and
//! notifications) and the role (to gate operator transitions).

use axum::http::HeaderMap;
use domain::{Actor, CustomerId};
use uuid::Uuid;

use crate::error::ApiError;

/// Role of the authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Operator,
}

/// An authenticated session, as the upstream authenticator resolved it.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
}

impl Session {
    /// Resolves the session from the `x-user-id` and `x-role` headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let user_id = headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::BadRequest("missing x-user-id header".to_string()))?;
        let user_id = Uuid::parse_str(user_id)
            .map_err(|e| ApiError::BadRequest(format!("Invalid x-user-id: {e}")))?;

        let role = match headers.get("x-role").and_then(|v| v.to_str().ok()) {
            Some("operator") => Role::Operator,
            Some("customer") | None => Role::Customer,
            Some(other) => {
                return Err(ApiError::BadRequest(format!("Unknown role: {other}")));
            }
        };

        Ok(Self { user_id, role })
    }

    /// Returns the customer identity of this session.
    pub fn customer_id(&self) -> CustomerId {
        CustomerId::from_uuid(self.user_id)
    }

    /// Returns the domain actor this session acts as.
    pub fn actor(&self) -> Actor {
        match self.role {
            Role::Customer => Actor::Customer(self.customer_id()),
            Role::Operator => Actor::Operator(self.user_id.to_string()),
        }
    }

    /// Returns true for operator sessions.
    pub fn is_operator(&self) -> bool {
        self.role == Role::Operator
    }

    /// Rejects non-operator sessions.
    pub fn require_operator(&self) -> Result<(), ApiError> {
        if self.is_operator() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "operator role required".to_string(),
            ))
        }
    }
}
