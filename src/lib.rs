// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity Server - Token Authentication & RBAC Service
//!
//! This crate provides an HTTP identity service: stateless JWT
//! authentication (separate access and refresh key domains) with
//! role/permission-based authorization resolved from a relational
//! store.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, authority resolver, interceptor
//! - `seed` - Startup role/admin/permission-catalog bootstrap
//! - `store` - In-memory user/role/permission store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod seed;
pub mod state;
pub mod store;
