// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mapping from a principal's roles to a flat authority set.
//!
//! For every role the resolver emits one authority per attached
//! permission (the permission name verbatim) plus exactly one
//! `ROLE_<name>` marker. Duplicates across roles collapse under set
//! semantics.
//!
//! The set is recomputed on every authentication and never cached per
//! principal, so a grant change takes effect on the next login or
//! refresh. Already-issued tokens are self-contained and are not
//! re-validated against live grants.

use std::collections::BTreeSet;

use crate::store::{Permission, Role, User, UserStore};

/// Marker prefix for role-membership authorities.
const ROLE_MARKER_PREFIX: &str = "ROLE_";

/// Pure derivation over role/permission snapshots.
pub fn authorities_of(roles: &[(Role, Vec<Permission>)]) -> BTreeSet<String> {
    let mut authorities = BTreeSet::new();
    for (role, permissions) in roles {
        for permission in permissions {
            authorities.insert(permission.name.clone());
        }
        authorities.insert(role_marker(&role.name));
    }
    authorities
}

/// Fetch value-type snapshots for `user` from the store and derive its
/// authority set.
pub fn resolve_authorities(store: &UserStore, user: &User) -> BTreeSet<String> {
    let snapshots: Vec<(Role, Vec<Permission>)> = store
        .roles_of(user)
        .into_iter()
        .map(|role| {
            let permissions = store.permissions_of(&role);
            (role, permissions)
        })
        .collect();
    authorities_of(&snapshots)
}

/// `ROLE_ADMIN` stays `ROLE_ADMIN`; a bare name gains the prefix.
fn role_marker(name: &str) -> String {
    if name.starts_with(ROLE_MARKER_PREFIX) {
        name.to_string()
    } else {
        format!("{ROLE_MARKER_PREFIX}{name}")
    }
}
