//! Access token codec: issue, verify and refresh HS256-signed JWTs.
//!
//! Verification order is fixed: structure, then signature, then claim shape, then expiry.
//! A tampered token therefore always reports `InvalidSignature`, even when its (forged)
//! expiry is already in the past.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};
use tracing::{debug, error};
use uuid::Uuid;

use crate::services::auth::claims::Claims;
use crate::services::auth::clock::Clock;
use crate::services::auth::error::AuthError;
use crate::services::auth::signing_key::SigningKey;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
    // Exact clock reading at issuance; `claims.iat` is truncated to the second.
    pub issued_at: DateTime<Utc>,
}

impl IssuedToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }

    /// Whole seconds of validity left at issuance, rounded down.
    pub fn expires_in(&self) -> u64 {
        (self.expires_at() - self.issued_at).num_seconds().max(0) as u64
    }
}

/// One year. Longer-lived bearer tokens are refused outright.
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

pub struct TokenCodec {
    key: SigningKey,
    ttl_seconds: u64,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(key: SigningKey, ttl_seconds: u64, clock: Arc<dyn Clock>) -> Result<Self, AuthError> {
        if ttl_seconds == 0 {
            return Err(AuthError::InvalidArgument("token ttl must be positive"));
        }
        if ttl_seconds > MAX_TTL_SECONDS {
            return Err(AuthError::InvalidArgument("token ttl is out of range"));
        }

        // Expiry is checked against our own clock (single reading, zero skew), so the
        // library only checks signature, algorithm and claim presence.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            key,
            ttl_seconds,
            validation,
            clock,
        })
    }

    pub fn issue(&self, subject: &str, roles: Vec<String>) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, roles, self.clock.now())
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, self.clock.now())
    }

    /// Re-verifies `token` and mints a new one for the same subject and roles.
    ///
    /// The new token gets a fresh `iat`; nothing of the old lifetime is carried over.
    pub fn refresh(&self, token: &str) -> Result<IssuedToken, AuthError> {
        self.refresh_with(token, |_| Ok(()))
    }

    /// `refresh` with an extra gate between verification and issuance (e.g. a revocation
    /// check). Both steps share one clock reading.
    pub fn refresh_with<F>(&self, token: &str, gate: F) -> Result<IssuedToken, AuthError>
    where
        F: FnOnce(&Claims) -> Result<(), AuthError>,
    {
        let now = self.clock.now();
        let claims = self.verify_at(token, now)?;
        gate(&claims)?;
        self.issue_at(&claims.sub, claims.roles, now)
    }

    fn issue_at(
        &self,
        subject: &str,
        roles: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        if subject.trim().is_empty() {
            return Err(AuthError::InvalidArgument("subject must not be empty"));
        }

        let iat = now.timestamp();
        let exp = (now + ChronoDuration::seconds(self.ttl_seconds as i64)).timestamp();

        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
            roles,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());

        let token = jsonwebtoken::encode(&header, &claims, self.key.encoding_key()).map_err(|e| {
            error!(error = %e, "failed to sign access token");
            AuthError::Signing(e.to_string())
        })?;

        debug!(sub = %claims.sub, exp = claims.exp, "issued access token");

        Ok(IssuedToken {
            token,
            claims,
            issued_at: now,
        })
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        check_structure(token)?;

        let data = jsonwebtoken::decode::<Claims>(token, self.key.decoding_key(), &self.validation)
            .map_err(classify)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() || claims.exp <= claims.iat {
            return Err(AuthError::UnsupportedFormat);
        }
        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}

/// Rejects anything that is not `header.payload.signature` with a parseable header and a
/// base64url JSON payload. After this passes, a decoding failure can only come from the
/// signature segment or from the shape of the claims.
fn check_structure(token: &str) -> Result<(), AuthError> {
    let mut parts = token.splitn(3, '.');
    let (Some(header), Some(payload), Some(signature)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::Malformed);
    };
    if header.is_empty() || payload.is_empty() {
        return Err(AuthError::Malformed);
    }

    let raw_header = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AuthError::Malformed)?;
    serde_json::from_slice::<Header>(&raw_header).map_err(|_| AuthError::Malformed)?;

    let raw = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::Malformed)?;
    let value: serde_json::Value =
        serde_json::from_slice(&raw).map_err(|_| AuthError::Malformed)?;
    if !value.is_object() {
        return Err(AuthError::UnsupportedFormat);
    }

    // Header and payload are intact, so an extra '.' can only sit in the signature.
    if signature.contains('.') {
        return Err(AuthError::InvalidSignature);
    }

    Ok(())
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        // Header and payload already decoded cleanly, so a base64 failure here is a
        // damaged signature segment. `alg` is part of the signed input: a header naming
        // another algorithm is a tampered header.
        ErrorKind::InvalidSignature | ErrorKind::Base64(_) | ErrorKind::InvalidAlgorithm => {
            AuthError::InvalidSignature
        }
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AuthError::UnsupportedFormat,
        _ => AuthError::Malformed,
    }
}
