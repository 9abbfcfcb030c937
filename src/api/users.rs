// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User management endpoints. All mutations are authority-guarded.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{password, Auth, AuthenticatedUser},
    error::ApiError,
    models::{
        PageQuery, PaginatedResponse, RegisterUserRequest, UpdateUserRequest, UserResponse,
    },
    state::AppState,
    store::{StoreError, User},
};

const MIN_PASSWORD_LEN: usize = 6;
const DEFAULT_PAGE_SIZE: usize = 20;

#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterUserRequest,
    tag = "Users",
    responses(
        (status = 201, body = UserResponse),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Missing ADD_USER authority"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    actor.require_authority("ADD_USER")?;

    let email = validate_email(&request.email)?;
    let first_name = required_field(&request.first_name, "first_name")?;
    let last_name = required_field(&request.last_name, "last_name")?;
    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let mut store = state.store.write().await;

    let mut role_ids = std::collections::BTreeSet::new();
    for name in &request.roles {
        let role = store
            .find_role_by_name(name)
            .ok_or_else(|| ApiError::bad_request(format!("unknown role {name}")))?;
        role_ids.insert(role.id);
    }

    let password_hash = password::hash_password(&request.password)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let user = store
        .insert_user(User {
            id: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash,
            first_name,
            last_name,
            active: request.active,
            role_ids,
            created_at: chrono::Utc::now(),
        })
        .map_err(|e| match e {
            StoreError::Conflict(what) => ApiError::conflict(format!("{what} already exists")),
            StoreError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
        })?;

    tracing::info!(email = %user.email, by = %actor.email, "user registered");

    let roles = store.roles_of(&user);
    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_user(&user, &roles)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    request_body = UpdateUserRequest,
    tag = "Users",
    responses(
        (status = 200, body = UserResponse),
        (status = 403, description = "Missing UPDATE_USER authority"),
        (status = 404, description = "Unknown user"),
        (status = 409, description = "Email belongs to another user")
    )
)]
pub async fn update_user(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    actor.require_authority("UPDATE_USER")?;

    let email = validate_email(&request.email)?;
    let first_name = required_field(&request.first_name, "first_name")?;
    let last_name = required_field(&request.last_name, "last_name")?;

    let mut store = state.store.write().await;
    let mut user = store
        .get_user(&id)
        .map_err(|_| ApiError::not_found(format!("User {id} not found")))?;

    user.email = email;
    user.first_name = first_name;
    user.last_name = last_name;

    let user = store.update_user(user).map_err(|e| match e {
        StoreError::Conflict(what) => ApiError::conflict(format!("{what} already exists")),
        StoreError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
    })?;

    tracing::info!(user_id = %user.id, by = %actor.email, "user updated");

    let roles = store.roles_of(&user);
    Ok(Json(UserResponse::from_user(&user, &roles)))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(PageQuery),
    tag = "Users",
    responses(
        (status = 200, body = PaginatedResponse<UserResponse>),
        (status = 403, description = "Missing VIEW_USER authority")
    )
)]
pub async fn list_users(
    Auth(actor): Auth,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, ApiError> {
    actor.require_authority("VIEW_USER")?;

    let store = state.store.read().await;
    let users: Vec<UserResponse> = store
        .list_users()
        .iter()
        .map(|user| UserResponse::from_user(user, &store.roles_of(user)))
        .collect();

    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE);
    Ok(Json(PaginatedResponse::paginate(users, page, size)))
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses((status = 200, body = AuthenticatedUser))
)]
pub async fn me(Auth(user): Auth) -> Json<AuthenticatedUser> {
    Json(user)
}

fn validate_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("a valid email is required"));
    }
    Ok(email)
}

fn required_field(raw: &str, name: &str) -> Result<String, ApiError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{name} is required")));
    }
    Ok(value.to_string())
}
