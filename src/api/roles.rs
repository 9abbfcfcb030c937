// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role CRUD endpoints.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{CreateRoleRequest, RoleResponse, UpdateRoleRequest},
    state::AppState,
    store::{StoreError, UserStore},
};

#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Roles",
    responses(
        (status = 200, body = Vec<RoleResponse>),
        (status = 403, description = "Missing VIEW_ROLE authority")
    )
)]
pub async fn list_roles(
    Auth(actor): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<RoleResponse>>, ApiError> {
    actor.require_authority("VIEW_ROLE")?;

    let store = state.store.read().await;
    let roles = store
        .list_roles()
        .iter()
        .map(|role| RoleResponse::from_role(role, &store.permissions_of(role)))
        .collect();
    Ok(Json(roles))
}

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleRequest,
    tag = "Roles",
    responses(
        (status = 201, body = RoleResponse),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Missing ADD_ROLE authority"),
        (status = 409, description = "Role name taken")
    )
)]
pub async fn create_role(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), ApiError> {
    actor.require_authority("ADD_ROLE")?;

    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let mut store = state.store.write().await;
    let permission_ids = resolve_permission_ids(&store, &request.permissions)?;

    let role = store
        .insert_role(crate::store::Role {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            permission_ids,
            created_at: chrono::Utc::now(),
        })
        .map_err(|e| match e {
            StoreError::Conflict(what) => ApiError::conflict(format!("{what} already exists")),
            StoreError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
        })?;

    tracing::info!(role = %role.name, by = %actor.email, "role created");

    let permissions = store.permissions_of(&role);
    Ok((
        StatusCode::CREATED,
        Json(RoleResponse::from_role(&role, &permissions)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    request_body = UpdateRoleRequest,
    tag = "Roles",
    responses(
        (status = 200, body = RoleResponse),
        (status = 403, description = "Missing UPDATE_ROLE authority"),
        (status = 404, description = "Unknown role"),
        (status = 409, description = "Role name taken")
    )
)]
pub async fn update_role(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<RoleResponse>, ApiError> {
    actor.require_authority("UPDATE_ROLE")?;

    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }

    let mut store = state.store.write().await;
    let mut role = store
        .get_role(&id)
        .map_err(|_| ApiError::not_found(format!("Role {id} not found")))?;

    role.name = name;
    role.permission_ids = resolve_permission_ids(&store, &request.permissions)?;

    let role = store.update_role(role).map_err(|e| match e {
        StoreError::Conflict(what) => ApiError::conflict(format!("{what} already exists")),
        StoreError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
    })?;

    tracing::info!(role = %role.name, by = %actor.email, "role updated");

    let permissions = store.permissions_of(&role);
    Ok(Json(RoleResponse::from_role(&role, &permissions)))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "Roles",
    responses(
        (status = 204),
        (status = 403, description = "Missing DELETE_ROLE authority"),
        (status = 404, description = "Unknown role")
    )
)]
pub async fn delete_role(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    actor.require_authority("DELETE_ROLE")?;

    let mut store = state.store.write().await;
    store
        .delete_role(&id)
        .map_err(|_| ApiError::not_found(format!("Role {id} not found")))?;

    tracing::info!(role_id = %id, by = %actor.email, "role deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Map permission names to ids; any unknown name rejects the request.
fn resolve_permission_ids(
    store: &UserStore,
    names: &[String],
) -> Result<BTreeSet<String>, ApiError> {
    let mut ids = BTreeSet::new();
    for name in names {
        let permission = store
            .find_permission_by_name(name)
            .ok_or_else(|| ApiError::bad_request(format!("unknown permission {name}")))?;
        ids.insert(permission.id);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;

    fn actor_with(authorities: &[&str]) -> Auth {
        Auth(AuthenticatedUser {
            user_id: "actor-1".to_string(),
            email: "admin@example.com".to_string(),
            authorities: authorities.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn create_role_attaches_existing_permissions() {
        let state = AppState::for_tests();
        state
            .store
            .write()
            .await
            .resolve_or_create_permission("VIEW_REPORT");

        let (status, Json(created)) = create_role(
            actor_with(&["ADD_ROLE"]),
            State(state),
            Json(CreateRoleRequest {
                name: "ROLE_AUDITOR".to_string(),
                permissions: vec!["VIEW_REPORT".to_string()],
            }),
        )
        .await
        .expect("create succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.name, "ROLE_AUDITOR");
        assert_eq!(created.permissions, vec!["VIEW_REPORT".to_string()]);
    }

    #[tokio::test]
    async fn create_role_rejects_unknown_permission() {
        let state = AppState::for_tests();

        let err = create_role(
            actor_with(&["ADD_ROLE"]),
            State(state),
            Json(CreateRoleRequest {
                name: "ROLE_AUDITOR".to_string(),
                permissions: vec!["NOT_A_PERMISSION".to_string()],
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_role_rejects_duplicate_name() {
        let state = AppState::for_tests();
        state.store.write().await.resolve_or_create_role("ROLE_AUDITOR");

        let err = create_role(
            actor_with(&["ADD_ROLE"]),
            State(state),
            Json(CreateRoleRequest {
                name: "ROLE_AUDITOR".to_string(),
                permissions: vec![],
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn role_crud_is_authority_guarded() {
        let state = AppState::for_tests();

        let err = list_roles(actor_with(&[]), State(state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        let err = delete_role(
            actor_with(&["VIEW_ROLE"]),
            State(state),
            Path("some-id".to_string()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn delete_role_removes_it_from_listing() {
        let state = AppState::for_tests();
        let role = state
            .store
            .write()
            .await
            .resolve_or_create_role("ROLE_TEMP");

        let status = delete_role(
            actor_with(&["DELETE_ROLE"]),
            State(state.clone()),
            Path(role.id),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(roles) = list_roles(actor_with(&["VIEW_ROLE"]), State(state))
            .await
            .unwrap();
        assert!(roles.is_empty());
    }

    #[tokio::test]
    async fn update_role_replaces_permission_set() {
        let state = AppState::for_tests();
        let role_id = {
            let mut store = state.store.write().await;
            store.resolve_or_create_permission("VIEW_USER");
            store.resolve_or_create_permission("ADD_USER");
            let perm = store.find_permission_by_name("VIEW_USER").unwrap();
            let mut role = store.resolve_or_create_role("ROLE_STAFF");
            role.permission_ids.insert(perm.id);
            store.update_role(role).unwrap().id
        };

        let Json(updated) = update_role(
            actor_with(&["UPDATE_ROLE"]),
            State(state),
            Path(role_id),
            Json(UpdateRoleRequest {
                name: "ROLE_STAFF".to_string(),
                permissions: vec!["ADD_USER".to_string()],
            }),
        )
        .await
        .unwrap();

        assert_eq!(updated.permissions, vec!["ADD_USER".to_string()]);
    }
}
