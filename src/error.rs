use std::fmt;

/// Failure reported by a [`PrimitiveProvider`](crate::PrimitiveProvider).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The AEAD primitive rejected the tag.
    Authentication,
    /// The block cipher found a malformed PKCS#7 trailer.
    InvalidPadding,
    /// Raw key material was rejected by the primitive.
    InvalidKey(String),
    /// Any other malformed input (IV size, ciphertext framing, ...).
    InvalidInput(String),
    /// The random source could not produce bytes.
    Random(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Authentication => write!(f, "aead tag rejected"),
            ProviderError::InvalidPadding => write!(f, "invalid block padding"),
            ProviderError::InvalidKey(m) => write!(f, "invalid key material: {m}"),
            ProviderError::InvalidInput(m) => write!(f, "invalid input: {m}"),
            ProviderError::Random(m) => write!(f, "random source unavailable: {m}"),
        }
    }
}

impl std::error::Error for ProviderError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    UnsupportedAlgorithm(String),
    InvalidKeyLength { expected: usize, actual: usize },
    InvalidIvLength { expected: usize, actual: usize },
    /// Covers tag mismatch and bad padding alike.
    AuthenticationFailed,
    Provider(ProviderError),
}

impl fmt::Display for CipherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherError::UnsupportedAlgorithm(alg) => {
                write!(f, "unsupported content encryption algorithm '{alg}'")
            }
            CipherError::InvalidKeyLength { expected, actual } => write!(
                f,
                "invalid content encryption key length: expected {expected} bytes, got {actual}"
            ),
            CipherError::InvalidIvLength { expected, actual } => write!(
                f,
                "invalid initialization vector length: expected {expected} bytes, got {actual}"
            ),
            CipherError::AuthenticationFailed => {
                write!(f, "authentication failed: invalid key or corrupted data")
            }
            CipherError::Provider(e) => write!(f, "primitive provider error: {e}"),
        }
    }
}

impl std::error::Error for CipherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CipherError::Provider(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProviderError> for CipherError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Authentication | ProviderError::InvalidPadding => {
                CipherError::AuthenticationFailed
            }
            other => CipherError::Provider(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CipherError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn authentication_provider_errors_collapse() {
        assert_eq!(
            CipherError::from(ProviderError::Authentication),
            CipherError::AuthenticationFailed
        );
        assert_eq!(
            CipherError::from(ProviderError::InvalidPadding),
            CipherError::AuthenticationFailed
        );
        assert_eq!(
            CipherError::from(ProviderError::Authentication).to_string(),
            CipherError::from(ProviderError::InvalidPadding).to_string()
        );
    }

    #[test]
    fn other_provider_errors_pass_through() {
        let err = CipherError::from(ProviderError::InvalidKey("bad size".into()));
        match &err {
            CipherError::Provider(ProviderError::InvalidKey(m)) => assert_eq!(m, "bad size"),
            other => panic!("expected Provider(InvalidKey), got: {other:?}"),
        }
        assert!(err.source().is_some());
    }

    #[test]
    fn key_length_message_names_both_sizes() {
        let err = CipherError::InvalidKeyLength {
            expected: 32,
            actual: 31,
        };
        let msg = err.to_string();
        assert!(msg.contains("32"));
        assert!(msg.contains("31"));
    }
}
