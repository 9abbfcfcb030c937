// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Wire shape is a single `error` string field. Expired and forged
//! tokens share one generic unauthorized message so callers cannot
//! probe which of the two occurred.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug)]
pub enum AuthError {
    /// Wrong password or unresolvable principal at login.
    InvalidCredentials,
    /// Credentials valid but the account is deactivated. Deliberately
    /// distinct from `InvalidCredentials`: administrative state, not a
    /// secret-guessing signal.
    Disabled,
    /// Missing signature match, malformed token, or expired token.
    Unauthorized(String),
    /// Authenticated but lacking a required authority.
    Forbidden(String),
    /// Internal invariant violation (e.g. empty signed token). Fatal to
    /// the in-flight request.
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Disabled | AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid Credential"),
            AuthError::Disabled => {
                write!(f, "User disabled by admin. Please contact admin to enable user")
            }
            AuthError::Unauthorized(detail) => write!(f, "Unauthorized: {detail}"),
            AuthError::Forbidden(detail) => write!(f, "Forbidden: {detail}"),
            AuthError::Internal(detail) => write!(f, "Internal server error: {detail}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
