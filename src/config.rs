// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `ACCESS_TOKEN_SECRET` | HMAC key for access tokens | Required |
//! | `REFRESH_TOKEN_SECRET` | HMAC key for refresh tokens | Required |
//! | `ADMIN_BOOTSTRAP_PASSWORD` | Initial admin password | `change-me` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Token key material is a configuration input to the codec, sourced
//! from a secrets mechanism external to this service. The two keys
//! must differ; identical keys would collapse the access/refresh key
//! domains.

use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ")]
    IdenticalSecrets,
    #[error("invalid PORT value: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub admin_bootstrap_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_token_secret =
            env::var("ACCESS_TOKEN_SECRET").map_err(|_| ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;
        let refresh_token_secret = env::var("REFRESH_TOKEN_SECRET")
            .map_err(|_| ConfigError::Missing("REFRESH_TOKEN_SECRET"))?;

        check_key_domains(&access_token_secret, &refresh_token_secret)?;

        let port_raw = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let port: u16 = port_raw
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port_raw))?;

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            access_token_secret,
            refresh_token_secret,
            admin_bootstrap_password: env::var("ADMIN_BOOTSTRAP_PASSWORD")
                .unwrap_or_else(|_| "change-me".to_string()),
        })
    }
}

fn check_key_domains(access: &str, refresh: &str) -> Result<(), ConfigError> {
    if access == refresh {
        return Err(ConfigError::IdenticalSecrets);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_secrets_are_rejected() {
        assert!(matches!(
            check_key_domains("same", "same"),
            Err(ConfigError::IdenticalSecrets)
        ));
        assert!(check_key_domains("one", "two").is_ok());
    }
}
