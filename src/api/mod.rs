// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::AuthenticatedUser,
    models::{
        AuthenticationResponse, CreateRoleRequest, LoginRequest, PaginatedResponse,
        PermissionResponse, RefreshResponse, RegisterUserRequest, RoleResponse, RoleSummary,
        UpdateRoleRequest, UpdateUserRequest, UserResponse,
    },
    state::AppState,
};

pub mod auth;
pub mod permissions;
pub mod roles;
pub mod users;

pub fn router(state: AppState) -> Router {
    // Full paths rather than a nested prefix: the interceptor matches
    // its bypass path against `request.uri().path()`.
    let api_routes = Router::new()
        .route("/api/users/login", post(auth::login))
        .route("/api/auth/refresh-token", post(auth::refresh_token))
        .route("/api/users/register", post(users::register))
        .route("/api/users", get(users::list_users))
        .route("/api/users/me", get(users::me))
        .route("/api/users/{id}", put(users::update_user))
        .route("/api/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/api/roles/{id}",
            put(roles::update_role).delete(roles::delete_role),
        )
        .route("/api/permissions", get(permissions::list_permissions))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::middleware::authenticate,
        ))
        .with_state(state);

    api_routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::refresh_token,
        users::register,
        users::update_user,
        users::list_users,
        users::me,
        roles::list_roles,
        roles::create_role,
        roles::update_role,
        roles::delete_role,
        permissions::list_permissions
    ),
    components(
        schemas(
            LoginRequest,
            AuthenticationResponse,
            RefreshResponse,
            RoleSummary,
            RegisterUserRequest,
            UpdateUserRequest,
            UserResponse,
            PaginatedResponse<UserResponse>,
            CreateRoleRequest,
            UpdateRoleRequest,
            RoleResponse,
            PermissionResponse,
            AuthenticatedUser
        )
    ),
    tags(
        (name = "Auth", description = "Login and token refresh"),
        (name = "Users", description = "User management"),
        (name = "Roles", description = "Role management"),
        (name = "Permissions", description = "Permission catalog")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn seeded_app() -> (Router, AppState) {
        let state = AppState::for_tests();
        seed::run(&state, "secret1").await.expect("seeding");
        (router(state.clone()), state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn admin_login_yields_admin_authorities() {
        let (app, _) = seeded_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/users/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"email":"admin@example.com","password":"secret1"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let login = body_json(response).await;
        let access_token = login["access_token"].as_str().unwrap().to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/users/me")
                    .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me = body_json(response).await;

        let authorities: Vec<&str> = me["authorities"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(authorities.contains(&"ROLE_ADMIN"));
        assert!(authorities.contains(&"VIEW_USER"));
        assert!(authorities.contains(&"ADD_USER"));
    }

    #[tokio::test]
    async fn tampered_bearer_token_is_rejected_with_401() {
        let (app, state) = seeded_app().await;

        let token = state
            .tokens
            .issue_access("admin@example.com", &Default::default())
            .unwrap();
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/users/me")
                    .header(header::AUTHORIZATION, format!("Bearer {tampered}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().starts_with("Unauthorized:"));
    }

    #[tokio::test]
    async fn request_without_token_reaches_downstream_authorization() {
        let (app, _) = seeded_app().await;

        // No bearer: the interceptor lets the request through and the
        // extractor rejects it, not the interceptor.
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/users/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Unauthorized: authentication required");
    }

    #[tokio::test]
    async fn refresh_endpoint_bypasses_access_token_validation() {
        let (app, state) = seeded_app().await;
        let refresh = state.tokens.issue_refresh("admin@example.com").unwrap();

        // A garbage bearer header would fail anywhere else; the refresh
        // endpoint must ignore it and honor the cookie.
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/refresh-token")
                    .header(header::AUTHORIZATION, "Bearer garbage")
                    .header(
                        header::COOKIE,
                        format!("{}={refresh}", auth::REFRESH_COOKIE),
                    )
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(state
            .tokens
            .verify_access(body["access_token"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn guarded_route_rejects_missing_authority() {
        let (app, state) = seeded_app().await;
        {
            let mut store = state.store.write().await;
            let role = store.resolve_or_create_role("ROLE_USER");
            let mut user = crate::store::User {
                id: uuid::Uuid::new_v4().to_string(),
                email: "plain@example.com".to_string(),
                password_hash: crate::auth::password::hash_password("secret1").unwrap(),
                first_name: "Plain".to_string(),
                last_name: "User".to_string(),
                active: true,
                role_ids: Default::default(),
                created_at: chrono::Utc::now(),
            };
            user.role_ids.insert(role.id);
            store.insert_user(user).unwrap();
        }
        let token = state
            .tokens
            .issue_access("plain@example.com", &Default::default())
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
