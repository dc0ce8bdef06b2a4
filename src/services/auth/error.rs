use thiserror::Error;

/// Everything that can go wrong while issuing, verifying or revoking a token, or while
/// turning a verified token into a principal.
///
/// Kinds are fine-grained for logs ("expired" vs "tampered"). They never reach the client
/// as-is: the HTTP boundary collapses all token and identity kinds into one 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("unsupported token format")]
    UnsupportedFormat,

    #[error("token revoked")]
    Revoked,

    #[error("identity not found")]
    IdentityNotFound,

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("identity store unavailable: {0}")]
    IdentityUnavailable(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    /// Stable, low-cardinality label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::InvalidSignature => "invalid_signature",
            Self::Expired => "expired",
            Self::UnsupportedFormat => "unsupported_format",
            Self::Revoked => "revoked",
            Self::IdentityNotFound => "identity_not_found",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidCredentials => "invalid_credentials",
            Self::IdentityUnavailable(_) => "identity_unavailable",
            Self::Signing(_) => "signing",
        }
    }

    /// True for failures that should be read as a possible attack rather than a stale
    /// session.
    pub fn is_suspicious(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature | Self::Malformed | Self::UnsupportedFormat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels_are_distinct_for_verify_failures() {
        let kinds = [
            AuthError::Malformed.kind(),
            AuthError::InvalidSignature.kind(),
            AuthError::Expired.kind(),
            AuthError::UnsupportedFormat.kind(),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_expired_is_not_suspicious() {
        assert!(!AuthError::Expired.is_suspicious());
        assert!(!AuthError::Revoked.is_suspicious());
        assert!(AuthError::InvalidSignature.is_suspicious());
    }
}
