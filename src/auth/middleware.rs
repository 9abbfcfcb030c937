// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authentication interceptor.
//!
//! State machine for each inbound request:
//!
//! 1. The refresh-token endpoint bypasses the interceptor entirely
//!    (refresh must work without a currently valid access token).
//! 2. No bearer token is not an error; the request proceeds
//!    unauthenticated and downstream authorization decides.
//! 3. A present but invalid/expired token fails the request with 401
//!    before any downstream handling.
//! 4. A valid token is resolved to an [`AuthenticatedUser`] — subject
//!    lookup through the store plus a fresh authority derivation — and
//!    published in request extensions.
//! 5. Any unexpected failure after verification (e.g. the subject no
//!    longer resolves to a user) fails the request with 500 rather than
//!    silently continuing unauthenticated.
//!
//! Authorities are re-derived from the store on every request instead
//! of trusting the token's embedded claim; grant changes are therefore
//! visible immediately at the cost of one store lookup per request.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::authorities::resolve_authorities;
use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Path excluded from access-token validation.
pub const REFRESH_TOKEN_PATH: &str = "/api/auth/refresh-token";

/// Interceptor entry point, layered over the whole router with
/// `axum::middleware::from_fn_with_state`.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == REFRESH_TOKEN_PATH {
        return next.run(request).await;
    }

    let Some(token) = bearer_token(request.headers()) else {
        return next.run(request).await;
    };

    if !state.tokens.verify_access(&token) {
        tracing::warn!(path = %request.uri().path(), "rejected invalid or expired access token");
        return AuthError::Unauthorized("invalid or expired token".into()).into_response();
    }

    match identify(&state, &token).await {
        Ok(user) => {
            tracing::debug!(email = %user.email, "authenticated request");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to resolve authenticated identity");
            e.into_response()
        }
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Resolve an already-verified token to an identity. Failures here are
/// unexpected (the signature checked out) and surface as 500.
async fn identify(state: &AppState, token: &str) -> Result<AuthenticatedUser, AuthError> {
    let subject = state
        .tokens
        .subject_of_access(token)
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    let store = state.store.read().await;
    let user = store
        .find_user_by_email(&subject)
        .ok_or_else(|| AuthError::Internal(format!("no user for token subject {subject}")))?;

    let authorities = resolve_authorities(&store, &user);
    Ok(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
        authorities,
    })
}
