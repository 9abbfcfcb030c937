// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing and verification of access and refresh tokens.
//!
//! Two independent HS512 keys are used so that a leaked refresh token
//! can never be replayed as an access token and vice versa. Tokens are
//! stateless: validity is determined only by the signature and the
//! embedded expiry, there is no server-side revocation list.
//!
//! Access tokens carry the resolved authority list in a `roles` claim
//! (comma-joined), set exclusively at issuance. Refresh tokens carry
//! only the subject.

use std::collections::BTreeSet;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 7 days.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing produced an empty string. Should never happen with a
    /// correctly configured key; treat as a configuration alarm.
    #[error("generated token is empty")]
    EmptyToken,
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("invalid or expired token")]
    Invalid,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the principal's email.
    sub: String,
    iat: i64,
    exp: i64,
    /// Comma-joined authority list. Present on access tokens only.
    #[serde(skip_serializing_if = "Option::is_none")]
    roles: Option<String>,
}

/// Stateless token codec holding both signing key pairs.
///
/// Verification is bounded, synchronous, CPU-only work; the codec is
/// freely shared across requests behind an `Arc`.
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenCodec {
    /// Build a codec from externally provisioned key material. Keys are
    /// configuration inputs, never compiled-in constants.
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret),
            access_decoding: DecodingKey::from_secret(access_secret),
            refresh_encoding: EncodingKey::from_secret(refresh_secret),
            refresh_decoding: DecodingKey::from_secret(refresh_secret),
        }
    }

    /// Issue an access token for `subject` embedding the authority set.
    pub fn issue_access(
        &self,
        subject: &str,
        authorities: &BTreeSet<String>,
    ) -> Result<String, TokenError> {
        let roles = authorities.iter().cloned().collect::<Vec<_>>().join(",");
        sign(
            &self.access_encoding,
            subject,
            ACCESS_TOKEN_TTL_SECS,
            Some(roles),
        )
    }

    /// Issue a refresh token for `subject`. No authority claim.
    pub fn issue_refresh(&self, subject: &str) -> Result<String, TokenError> {
        sign(&self.refresh_encoding, subject, REFRESH_TOKEN_TTL_SECS, None)
    }

    /// Returns false on any signature mismatch, malformed structure or
    /// expiry violation. Those are expected negative outcomes, never
    /// errors.
    pub fn verify_access(&self, token: &str) -> bool {
        parse(&self.access_decoding, token).is_ok()
    }

    pub fn verify_refresh(&self, token: &str) -> bool {
        parse(&self.refresh_decoding, token).is_ok()
    }

    /// Subject of a verified access token. Verifies again internally so
    /// the codec defends against being called without `verify_access`.
    pub fn subject_of_access(&self, token: &str) -> Result<String, TokenError> {
        parse(&self.access_decoding, token).map(|c| c.sub)
    }

    pub fn subject_of_refresh(&self, token: &str) -> Result<String, TokenError> {
        parse(&self.refresh_decoding, token).map(|c| c.sub)
    }
}

fn sign(
    key: &EncodingKey,
    subject: &str,
    ttl_secs: i64,
    roles: Option<String>,
) -> Result<String, TokenError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        iat: now,
        exp: now + ttl_secs,
        roles,
    };
    let token = encode(&Header::new(Algorithm::HS512), &claims, key)?;
    if token.is_empty() {
        return Err(TokenError::EmptyToken);
    }
    Ok(token)
}

fn parse(key: &DecodingKey, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS512);
    // Expiry is the only termination mechanism; no clock-skew grace.
    validation.leeway = 0;
    decode::<Claims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|_| TokenError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"access-test-secret", b"refresh-test-secret")
    }

    fn authorities(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn access_token_round_trips() {
        let codec = codec();
        let token = codec
            .issue_access("admin@example.com", &authorities(&["VIEW_USER", "ROLE_ADMIN"]))
            .unwrap();

        assert!(codec.verify_access(&token));
        assert_eq!(
            codec.subject_of_access(&token).unwrap(),
            "admin@example.com"
        );
    }

    #[test]
    fn refresh_token_round_trips() {
        let codec = codec();
        let token = codec.issue_refresh("admin@example.com").unwrap();

        assert!(codec.verify_refresh(&token));
        assert_eq!(
            codec.subject_of_refresh(&token).unwrap(),
            "admin@example.com"
        );
    }

    #[test]
    fn key_domains_are_isolated() {
        let codec = codec();
        let access = codec
            .issue_access("admin@example.com", &authorities(&["VIEW_USER"]))
            .unwrap();
        let refresh = codec.issue_refresh("admin@example.com").unwrap();

        assert!(!codec.verify_refresh(&access));
        assert!(!codec.verify_access(&refresh));
        assert!(codec.subject_of_refresh(&access).is_err());
        assert!(codec.subject_of_access(&refresh).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let token = sign(
            &codec.access_encoding,
            "admin@example.com",
            -3600, // already expired
            None,
        )
        .unwrap();

        assert!(!codec.verify_access(&token));
        assert!(matches!(
            codec.subject_of_access(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let codec = codec();
        let token = codec
            .issue_access("admin@example.com", &authorities(&["VIEW_USER"]))
            .unwrap();

        // Flip one character in the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(!codec.verify_access(&tampered));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let codec = codec();
        let token = codec
            .issue_access("user@example.com", &authorities(&["VIEW_USER"]))
            .unwrap();

        // Rewrite the payload segment to claim a different subject.
        let parts: Vec<&str> = token.split('.').collect();
        let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        let forged = String::from_utf8(payload)
            .unwrap()
            .replace("user@example.com", "admin@example.com");
        let forged_token = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(forged.as_bytes()),
            parts[2]
        );

        assert!(!codec.verify_access(&forged_token));
    }

    #[test]
    fn malformed_token_is_rejected_without_panicking() {
        let codec = codec();
        assert!(!codec.verify_access("not-a-token"));
        assert!(!codec.verify_access(""));
        assert!(codec.subject_of_access("garbage").is_err());
    }

    #[test]
    fn empty_authority_set_is_allowed() {
        let codec = codec();
        let token = codec
            .issue_access("admin@example.com", &BTreeSet::new())
            .unwrap();
        assert!(codec.verify_access(&token));
    }
}
