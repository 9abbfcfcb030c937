// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and
//! OpenAPI documentation.
//!
//! Stored entities live in [`crate::store`]; the response types here
//! are projections that never expose password hashes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::store::{Permission, Role, User};

// =============================================================================
// Authentication
// =============================================================================

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login identifier (email).
    pub email: String,
    /// Plaintext password, verified against the stored argon2 hash.
    pub password: String,
}

/// Compact role projection returned alongside authentication data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
}

impl From<&Role> for RoleSummary {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id.clone(),
            name: role.name.clone(),
        }
    }
}

/// Successful login response. The refresh token is additionally set as
/// an http-only cookie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticationResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub roles: Vec<RoleSummary>,
    pub access_token: String,
    pub refresh_token: String,
    pub active: bool,
}

/// Response of the refresh-token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

// =============================================================================
// Users
// =============================================================================

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub first_name: String,
    pub last_name: String,
    /// Stored lowercase; must be unique.
    pub email: String,
    /// Minimum 6 characters.
    pub password: String,
    /// Role names; every name must already exist.
    pub roles: Vec<String>,
    /// Defaults to active.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Request to update an existing user's profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// User projection without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub active: bool,
    pub roles: Vec<RoleSummary>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: &User, roles: &[Role]) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            active: user.active,
            roles: roles.iter().map(RoleSummary::from).collect(),
            created_at: user.created_at,
        }
    }
}

// =============================================================================
// Roles & Permissions
// =============================================================================

/// Request to create a role.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    /// Unique role name (`ROLE_*` convention).
    pub name: String,
    /// Permission names to attach; every name must already exist.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Request to update a role's name or permission set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Role projection with resolved permission names.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl RoleResponse {
    pub fn from_role(role: &Role, permissions: &[Permission]) -> Self {
        let mut names: Vec<String> = permissions.iter().map(|p| p.name.clone()).collect();
        names.sort();
        Self {
            id: role.id.clone(),
            name: role.name.clone(),
            permissions: names,
            created_at: role.created_at,
        }
    }
}

/// Permission projection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Permission> for PermissionResponse {
    fn from(permission: &Permission) -> Self {
        Self {
            id: permission.id.clone(),
            name: permission.name.clone(),
            created_at: permission.created_at,
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination query parameters.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Zero-based page index.
    pub page: Option<usize>,
    /// Page size (default 20).
    pub size: Option<usize>,
}

/// Pagination envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> PaginatedResponse<T> {
    /// Slice one page out of a full result set.
    pub fn paginate(all: Vec<T>, page: usize, size: usize) -> Self {
        let size = size.max(1);
        let total_items = all.len();
        let total_pages = total_items.div_ceil(size);
        let items = all
            .into_iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .collect();
        Self {
            items,
            page,
            size,
            total_items,
            total_pages,
        }
    }
}
