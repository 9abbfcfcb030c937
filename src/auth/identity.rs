// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated identity published by the interceptor.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::AuthError;

/// Identity resolved from a verified access token, scoped to a single
/// request. Carried in request extensions, never in global state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// The principal's unique id.
    pub user_id: String,
    /// Login identifier (token subject).
    pub email: String,
    /// Flattened authority set: permission names plus role markers.
    pub authorities: BTreeSet<String>,
}

impl AuthenticatedUser {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }

    /// Gate a handler on a single authority.
    pub fn require_authority(&self, authority: &str) -> Result<(), AuthError> {
        if self.has_authority(authority) {
            Ok(())
        } else {
            Err(AuthError::Forbidden(format!(
                "missing authority {authority}"
            )))
        }
    }
}
