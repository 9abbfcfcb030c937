// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup seeding of roles, the bootstrap admin and the permission
//! catalog.
//!
//! Ordering is an explicit linear sequence run to completion before
//! the service accepts traffic: default roles first, then the
//! bootstrap admin (which requires `ROLE_ADMIN` to exist), then the
//! CRUD permission catalog (which attaches to `ROLE_ADMIN`).
//!
//! Every step is resolve-or-create; running the seeder any number of
//! times over the same entity set converges to the same state. Seeding
//! failure aborts startup — the service must not accept traffic with
//! an incomplete authorization catalog.

use std::collections::BTreeSet;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::password;
use crate::state::AppState;
use crate::store::{User, UserStore};

/// Canonical CRUD actions, one permission per action per entity kind.
pub const DEFAULT_ACTIONS: [&str; 4] = ["ADD", "UPDATE", "DELETE", "VIEW"];

/// Role every generated permission is granted to.
pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// Roles guaranteed to exist after seeding.
pub const DEFAULT_ROLES: [&str; 2] = ["ROLE_ADMIN", "ROLE_USER"];

/// Login identifier of the bootstrap admin.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("required role {0} missing during seeding")]
    MissingRole(String),
    #[error("bootstrap password hashing failed: {0}")]
    Hash(String),
}

/// Run the full startup sequence.
pub async fn run(state: &AppState, admin_password: &str) -> Result<(), SeedError> {
    let mut store = state.store.write().await;
    seed_default_roles(&mut store);
    seed_default_admin(&mut store, admin_password)?;
    let entities = store.entity_names();
    seed_permission_catalog(&mut store, &entities)?;
    Ok(())
}

/// Ensure the default roles exist.
pub fn seed_default_roles(store: &mut UserStore) {
    for name in DEFAULT_ROLES {
        let existed = store.find_role_by_name(name).is_some();
        store.resolve_or_create_role(name);
        if existed {
            tracing::debug!(role = name, "role already exists");
        } else {
            tracing::info!(role = name, "role created");
        }
    }
}

/// Ensure the bootstrap admin user exists and holds `ROLE_ADMIN`.
pub fn seed_default_admin(store: &mut UserStore, password: &str) -> Result<(), SeedError> {
    let admin_role = store
        .find_role_by_name(ADMIN_ROLE)
        .ok_or_else(|| SeedError::MissingRole(ADMIN_ROLE.to_string()))?;

    if store.find_user_by_email(DEFAULT_ADMIN_EMAIL).is_some() {
        tracing::debug!(email = DEFAULT_ADMIN_EMAIL, "bootstrap admin already exists");
        return Ok(());
    }

    let password_hash =
        password::hash_password(password).map_err(|e| SeedError::Hash(e.to_string()))?;

    let mut role_ids = BTreeSet::new();
    role_ids.insert(admin_role.id);

    // insert_user can only conflict if the admin appeared concurrently;
    // either way the row exists afterwards.
    let _ = store.insert_user(User {
        id: Uuid::new_v4().to_string(),
        email: DEFAULT_ADMIN_EMAIL.to_string(),
        password_hash,
        first_name: "Admin".to_string(),
        last_name: "Admin".to_string(),
        active: true,
        role_ids,
        created_at: Utc::now(),
    });
    tracing::info!(email = DEFAULT_ADMIN_EMAIL, "bootstrap admin created");
    Ok(())
}

/// Ensure a `<ACTION>_<ENTITY>` permission exists for every entity kind
/// and every default action, all attached to `ROLE_ADMIN`.
///
/// Additive-only: permissions attached through other means are never
/// removed, and a steady-state run changes nothing observable.
pub fn seed_permission_catalog(
    store: &mut UserStore,
    entity_names: &BTreeSet<String>,
) -> Result<(), SeedError> {
    let mut admin_role = store.resolve_or_create_role(ADMIN_ROLE);
    let mut grew = false;

    for entity in entity_names {
        let upper = entity.to_uppercase();
        for action in DEFAULT_ACTIONS {
            let permission = store.resolve_or_create_permission(&format!("{action}_{upper}"));
            if admin_role.permission_ids.insert(permission.id) {
                grew = true;
            }
        }
        tracing::info!(entity = %entity, "permissions ensured for entity");
    }

    if grew {
        store
            .update_role(admin_role)
            .map_err(|_| SeedError::MissingRole(ADMIN_ROLE.to_string()))?;
    }
    Ok(())
}
