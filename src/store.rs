// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory relational store for users, roles and permissions.
//!
//! The store owns all persisted identity state and enforces the
//! uniqueness invariants before insert:
//!
//! - user emails are unique (stored lowercase)
//! - role names are unique (`ROLE_*` convention)
//! - permission names are unique (`<ACTION>_<ENTITY>` convention)
//!
//! `find_user_by_email` is the case-sensitive operational lookup used
//! by authentication; callers are expected to normalize input the same
//! way `insert_user` does.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A principal that can authenticate against the service.
///
/// The password hash is an argon2 PHC string and must never be
/// serialized into API responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub role_ids: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

/// A named grant bundle. Role names carry the `ROLE_` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub permission_ids: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

/// A single capability, named `<ACTION>_<ENTITY>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct UserStore {
    users: HashMap<String, User>,
    roles: HashMap<String, Role>,
    permissions: HashMap<String, Permission>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- users ---------------------------------------------------------------

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users.values().find(|u| u.email == email).cloned()
    }

    pub fn get_user(&self, user_id: &str) -> StoreResult<User> {
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("User {user_id}")))
    }

    pub fn insert_user(&mut self, user: User) -> StoreResult<User> {
        if self.find_user_by_email(&user.email).is_some() {
            return Err(StoreError::Conflict(format!("User {}", user.email)));
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn update_user(&mut self, user: User) -> StoreResult<User> {
        if !self.users.contains_key(&user.id) {
            return Err(StoreError::NotFound(format!("User {}", user.id)));
        }
        if let Some(other) = self.find_user_by_email(&user.email) {
            if other.id != user.id {
                return Err(StoreError::Conflict(format!("User {}", user.email)));
            }
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }

    // -- roles ---------------------------------------------------------------

    pub fn find_role_by_name(&self, name: &str) -> Option<Role> {
        self.roles.values().find(|r| r.name == name).cloned()
    }

    pub fn get_role(&self, role_id: &str) -> StoreResult<Role> {
        self.roles
            .get(role_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Role {role_id}")))
    }

    pub fn insert_role(&mut self, role: Role) -> StoreResult<Role> {
        if self.find_role_by_name(&role.name).is_some() {
            return Err(StoreError::Conflict(format!("Role {}", role.name)));
        }
        self.roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    pub fn update_role(&mut self, role: Role) -> StoreResult<Role> {
        if !self.roles.contains_key(&role.id) {
            return Err(StoreError::NotFound(format!("Role {}", role.id)));
        }
        if let Some(other) = self.find_role_by_name(&role.name) {
            if other.id != role.id {
                return Err(StoreError::Conflict(format!("Role {}", role.name)));
            }
        }
        self.roles.insert(role.id.clone(), role.clone());
        Ok(role)
    }

    pub fn delete_role(&mut self, role_id: &str) -> StoreResult<()> {
        if self.roles.remove(role_id).is_none() {
            return Err(StoreError::NotFound(format!("Role {role_id}")));
        }
        for user in self.users.values_mut() {
            user.role_ids.remove(role_id);
        }
        Ok(())
    }

    /// Find the named role or create an empty one. Guarded by the
    /// name-uniqueness check, so concurrent seeding converges on one row.
    pub fn resolve_or_create_role(&mut self, name: &str) -> Role {
        if let Some(role) = self.find_role_by_name(name) {
            return role;
        }
        let role = Role {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            permission_ids: BTreeSet::new(),
            created_at: Utc::now(),
        };
        self.roles.insert(role.id.clone(), role.clone());
        role
    }

    pub fn list_roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    // -- permissions ---------------------------------------------------------

    pub fn find_permission_by_name(&self, name: &str) -> Option<Permission> {
        self.permissions.values().find(|p| p.name == name).cloned()
    }

    pub fn insert_permission(&mut self, permission: Permission) -> StoreResult<Permission> {
        if self.find_permission_by_name(&permission.name).is_some() {
            return Err(StoreError::Conflict(format!(
                "Permission {}",
                permission.name
            )));
        }
        self.permissions
            .insert(permission.id.clone(), permission.clone());
        Ok(permission)
    }

    /// Find the named permission or create it.
    pub fn resolve_or_create_permission(&mut self, name: &str) -> Permission {
        if let Some(permission) = self.find_permission_by_name(name) {
            return permission;
        }
        let permission = Permission {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.permissions
            .insert(permission.id.clone(), permission.clone());
        permission
    }

    pub fn list_permissions(&self) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = self.permissions.values().cloned().collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        permissions
    }

    // -- relations -----------------------------------------------------------

    /// Snapshot of the roles assigned to a user. Dangling ids (role
    /// deleted after assignment) are skipped.
    pub fn roles_of(&self, user: &User) -> Vec<Role> {
        user.role_ids
            .iter()
            .filter_map(|id| self.roles.get(id).cloned())
            .collect()
    }

    /// Snapshot of the permissions attached to a role.
    pub fn permissions_of(&self, role: &Role) -> Vec<Permission> {
        role.permission_ids
            .iter()
            .filter_map(|id| self.permissions.get(id).cloned())
            .collect()
    }

    /// Every entity kind this store manages, as used by the permission
    /// catalog seeder to derive the CRUD permission set.
    pub fn entity_names(&self) -> BTreeSet<String> {
        ["User", "Role", "Permission"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}
