// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the identity published by the interceptor.
//!
//! Use the `Auth` extractor in handlers that require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     user.require_authority("VIEW_USER")?;
//!     // ...
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, AuthenticatedUser};

/// Extractor for an authenticated user.
///
/// The identity is taken from request extensions, where the
/// interceptor placed it after token verification. The extractor never
/// verifies tokens itself; the interceptor is the single verification
/// point, and identity stays explicit request-scoped context rather
/// than ambient global state.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(Auth)
            .ok_or_else(|| AuthError::Unauthorized("authentication required".into()))
    }
}
