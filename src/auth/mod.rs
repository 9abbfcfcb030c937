// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless JWT authentication with role-based access control.
//!
//! ## Auth Flow
//!
//! 1. Client logs in with email and password
//! 2. Server verifies the argon2 hash, resolves the authority set from
//!    the user's roles, and issues:
//!    - an access token (HS512, 15 min) carrying the authorities
//!    - a refresh token (HS512, 7 days, separate key) in an http-only
//!      cookie
//! 3. Subsequent requests send `Authorization: Bearer <access token>`
//! 4. The interceptor verifies the token, re-resolves authorities from
//!    the store, and publishes an [`AuthenticatedUser`] for the request
//!
//! ## Security
//!
//! - Access and refresh tokens use independent keys; neither verifies
//!   under the other's key
//! - Key material comes from configuration, never from source text
//! - Expired and forged tokens get one indistinguishable 401

pub mod authorities;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod token;

pub use authorities::{authorities_of, resolve_authorities};
pub use error::AuthError;
pub use extractor::Auth;
pub use identity::AuthenticatedUser;
pub use middleware::REFRESH_TOKEN_PATH;
pub use token::{TokenCodec, TokenError};
