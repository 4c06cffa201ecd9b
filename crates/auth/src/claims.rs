//! Token inspection: decoding claims and checking freshness.
//!
//! Tokens are JWT-shaped (`header.payload.signature`); only the payload is
//! looked at, and only for its *shape*. Whether the signature is genuine is
//! the server's problem, not this crate's.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::{BearerToken, Role};

/// Decoded token payload.
///
/// The fields this pipeline cares about are typed; everything else the
/// issuer put in the payload is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / principal identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiry instant (seconds since epoch on the wire).
    ///
    /// Absence is treated as already expired — fail closed.
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub exp: Option<DateTime<Utc>>,

    /// Role granted by the issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Remaining payload fields, untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, JsonValue>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token cannot be parsed as a claims-bearing token.
    ///
    /// Every decode failure maps here, whatever the input looked like.
    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Decode a bearer token's claims without validating its signature.
///
/// Tolerates arbitrary input: any string that is not three dot-separated
/// segments with a base64url JSON payload yields [`TokenError::Malformed`],
/// never a panic.
pub fn decode(token: &BearerToken) -> Result<Claims, TokenError> {
    let mut segments = token.as_str().split('.');

    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => {
            return Err(TokenError::Malformed(
                "expected three dot-separated segments".to_string(),
            ));
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::Malformed(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("payload is not a claims object: {e}")))
}

/// True if the claims are stale at `now`.
///
/// A missing `exp` counts as expired: a token we cannot date is a token we
/// do not trust.
pub fn is_expired(claims: &Claims, now: DateTime<Utc>) -> bool {
    match claims.exp {
        Some(exp) => now >= exp,
        None => true,
    }
}
