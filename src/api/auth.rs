// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and refresh-token endpoints.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration;

use crate::{
    auth::{password, resolve_authorities, token::REFRESH_TOKEN_TTL_SECS, AuthError},
    models::{AuthenticationResponse, LoginRequest, RefreshResponse, RoleSummary},
    state::AppState,
};

/// Name of the refresh-token cookie.
pub const REFRESH_COOKIE: &str = "refreshToken";

#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AuthenticationResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account disabled")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthenticationResponse>), AuthError> {
    let email = request.email.trim().to_lowercase();

    let store = state.store.read().await;
    let user = store
        .find_user_by_email(&email)
        .ok_or(AuthError::InvalidCredentials)?;

    if !user.active {
        tracing::warn!(email = %email, "login attempt on disabled account");
        return Err(AuthError::Disabled);
    }

    if !password::verify_password(&request.password, &user.password_hash) {
        tracing::warn!(email = %email, "login attempt with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let authorities = resolve_authorities(&store, &user);
    let roles: Vec<RoleSummary> = store.roles_of(&user).iter().map(RoleSummary::from).collect();

    let access_token = state
        .tokens
        .issue_access(&user.email, &authorities)
        .map_err(|e| AuthError::Internal(e.to_string()))?;
    let refresh_token = state
        .tokens
        .issue_refresh(&user.email)
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    tracing::info!(email = %email, "user authenticated");

    let jar = jar.add(refresh_cookie(refresh_token.clone()));
    Ok((
        jar,
        Json(AuthenticationResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            roles,
            access_token,
            refresh_token,
            active: user.active,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    tag = "Auth",
    responses(
        (status = 200, body = RefreshResponse),
        (status = 401, description = "Missing or invalid refresh token")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<RefreshResponse>), AuthError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AuthError::Unauthorized("missing refresh token".into()))?;

    if !state.tokens.verify_refresh(&token) {
        tracing::warn!("rejected invalid or expired refresh token");
        return Err(AuthError::Unauthorized("invalid or expired token".into()));
    }

    let subject = state
        .tokens
        .subject_of_refresh(&token)
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    let store = state.store.read().await;
    let user = store
        .find_user_by_email(&subject)
        .ok_or_else(|| AuthError::Unauthorized("unknown token subject".into()))?;

    if !user.active {
        return Err(AuthError::Disabled);
    }

    // Authorities come from the live store, not the old token.
    let authorities = resolve_authorities(&store, &user);
    let access_token = state
        .tokens
        .issue_access(&user.email, &authorities)
        .map_err(|e| AuthError::Internal(e.to_string()))?;
    let rotated = state
        .tokens
        .issue_refresh(&user.email)
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    tracing::info!(email = %user.email, "access token refreshed");

    let jar = jar.add(refresh_cookie(rotated.clone()));
    Ok((
        jar,
        Json(RefreshResponse {
            access_token,
            refresh_token: rotated,
        }),
    ))
}

/// Refresh-token cookie: http-only, whole-site path, lifetime matching
/// the token. Not marked `Secure`, so it is sent over plain HTTP too;
/// deployments terminate TLS upstream. SameSite=Lax keeps it off
/// cross-site subresource requests.
fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .path("/")
        .max_age(Duration::seconds(REFRESH_TOKEN_TTL_SECS))
        .same_site(SameSite::Lax)
        .build()
}
