// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::TokenCodec;
use crate::store::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<UserStore>>,
    pub tokens: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(store: UserStore, tokens: TokenCodec) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            tokens: Arc::new(tokens),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State with fixed test keys and an empty store.
    pub fn for_tests() -> Self {
        Self::new(
            UserStore::new(),
            TokenCodec::new(b"test-access-secret", b"test-refresh-secret"),
        )
    }
}
