// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission catalog listing. The catalog itself is seeded at
//! startup; this surface is read-only.

use axum::{extract::State, Json};

use crate::{auth::Auth, error::ApiError, models::PermissionResponse, state::AppState};

#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "Permissions",
    responses(
        (status = 200, body = Vec<PermissionResponse>),
        (status = 403, description = "Missing VIEW_PERMISSION authority")
    )
)]
pub async fn list_permissions(
    Auth(actor): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<PermissionResponse>>, ApiError> {
    actor.require_authority("VIEW_PERMISSION")?;

    let store = state.store.read().await;
    let permissions = store
        .list_permissions()
        .iter()
        .map(PermissionResponse::from)
        .collect();
    Ok(Json(permissions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use axum::http::StatusCode;

    fn actor_with(authorities: &[&str]) -> Auth {
        Auth(AuthenticatedUser {
            user_id: "actor-1".to_string(),
            email: "admin@example.com".to_string(),
            authorities: authorities.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn list_returns_catalog_sorted_by_name() {
        let state = AppState::for_tests();
        {
            let mut store = state.store.write().await;
            store.resolve_or_create_permission("VIEW_USER");
            store.resolve_or_create_permission("ADD_USER");
        }

        let Json(permissions) = list_permissions(actor_with(&["VIEW_PERMISSION"]), State(state))
            .await
            .unwrap();

        let names: Vec<&str> = permissions.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ADD_USER", "VIEW_USER"]);
    }

    #[tokio::test]
    async fn list_requires_view_permission_authority() {
        let state = AppState::for_tests();
        let err = list_permissions(actor_with(&["VIEW_USER"]), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
