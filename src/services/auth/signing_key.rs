use jsonwebtoken::{DecodingKey, EncodingKey};
use thiserror::Error;

/// Shortest accepted HMAC secret. Anything below this is treated as guessable.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningKeyError {
    #[error("signing secret is empty")]
    Empty,

    #[error("signing secret is too short: {len} bytes (need at least {min})")]
    TooShort { len: usize, min: usize },
}

/// Process-wide HMAC-SHA256 key material.
///
/// Built once at startup and shared read-only afterwards. Debug never prints key bytes.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

impl SigningKey {
    pub fn from_secret(secret: &[u8]) -> Result<Self, SigningKeyError> {
        if secret.is_empty() {
            return Err(SigningKeyError::Empty);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(SigningKeyError::TooShort {
                len: secret.len(),
                min: MIN_SECRET_LEN,
            });
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}
