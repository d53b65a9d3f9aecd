//! Content encryption algorithm catalog.
//!
//! Maps each supported identifier to the sizes and primitives it uses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::{BLOCK_LEN, GCM_NONCE_LEN, GCM_TAG_LEN};
use crate::error::{CipherError, Result};

/// Keyed-hash function backing a CBC-HMAC identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashVariant {
    Sha256,
    Sha384,
    Sha512,
}

impl HashVariant {
    /// Full digest length in bytes.
    pub fn digest_len(&self) -> usize {
        match self {
            HashVariant::Sha256 => 32,
            HashVariant::Sha384 => 48,
            HashVariant::Sha512 => 64,
        }
    }
}

/// Construction family and its family-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construction {
    /// AES-CBC encrypt-then-MAC with a truncated HMAC tag.
    CbcHmac {
        mac_key_len: usize,
        enc_key_len: usize,
        hash: HashVariant,
    },
    /// AES-GCM.
    Gcm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub key_len: usize,
    pub iv_len: usize,
    pub tag_len: usize,
    pub construction: Construction,
}

impl Params {
    const fn cbc_hmac(aes_key_len: usize, hash: HashVariant) -> Self {
        Self {
            key_len: aes_key_len * 2,
            iv_len: BLOCK_LEN,
            tag_len: aes_key_len,
            construction: Construction::CbcHmac {
                mac_key_len: aes_key_len,
                enc_key_len: aes_key_len,
                hash,
            },
        }
    }

    const fn gcm(aes_key_len: usize) -> Self {
        Self {
            key_len: aes_key_len,
            iv_len: GCM_NONCE_LEN,
            tag_len: GCM_TAG_LEN,
            construction: Construction::Gcm,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "A128CBC-HS256")]
    A128CbcHs256,
    #[serde(rename = "A192CBC-HS384")]
    A192CbcHs384,
    #[serde(rename = "A256CBC-HS512")]
    A256CbcHs512,
    #[serde(rename = "A128GCM")]
    A128Gcm,
    #[serde(rename = "A192GCM")]
    A192Gcm,
    #[serde(rename = "A256GCM")]
    A256Gcm,
}

impl Algorithm {
    pub const ALL: [Algorithm; 6] = [
        Algorithm::A128CbcHs256,
        Algorithm::A192CbcHs384,
        Algorithm::A256CbcHs512,
        Algorithm::A128Gcm,
        Algorithm::A192Gcm,
        Algorithm::A256Gcm,
    ];

    /// Registered identifier, e.g. `A128CBC-HS256`.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::A128CbcHs256 => "A128CBC-HS256",
            Algorithm::A192CbcHs384 => "A192CBC-HS384",
            Algorithm::A256CbcHs512 => "A256CBC-HS512",
            Algorithm::A128Gcm => "A128GCM",
            Algorithm::A192Gcm => "A192GCM",
            Algorithm::A256Gcm => "A256GCM",
        }
    }

    pub fn params(&self) -> Params {
        match self {
            Algorithm::A128CbcHs256 => Params::cbc_hmac(16, HashVariant::Sha256),
            Algorithm::A192CbcHs384 => Params::cbc_hmac(24, HashVariant::Sha384),
            Algorithm::A256CbcHs512 => Params::cbc_hmac(32, HashVariant::Sha512),
            Algorithm::A128Gcm => Params::gcm(16),
            Algorithm::A192Gcm => Params::gcm(24),
            Algorithm::A256Gcm => Params::gcm(32),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.name() == s)
            .ok_or_else(|| CipherError::UnsupportedAlgorithm(s.to_string()))
    }
}

/// Looks up the parameters registered for `name`.
///
/// # Errors
///
/// Returns [`CipherError::UnsupportedAlgorithm`] for any name outside the catalog.
pub fn lookup(name: &str) -> Result<Params> {
    name.parse::<Algorithm>().map(|alg| alg.params())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbc_hmac_key_is_twice_the_aes_key() {
        for alg in [
            Algorithm::A128CbcHs256,
            Algorithm::A192CbcHs384,
            Algorithm::A256CbcHs512,
        ] {
            let params = alg.params();
            match params.construction {
                Construction::CbcHmac {
                    mac_key_len,
                    enc_key_len,
                    hash,
                } => {
                    assert_eq!(params.key_len, mac_key_len + enc_key_len);
                    assert_eq!(mac_key_len, enc_key_len);
                    assert_eq!(params.tag_len, enc_key_len);
                    assert_eq!(hash.digest_len(), enc_key_len * 2);
                }
                Construction::Gcm => panic!("{alg} should be CBC-HMAC"),
            }
            assert_eq!(params.iv_len, 16);
        }
    }

    #[test]
    fn table_matches_registered_sizes() {
        let expected = [
            ("A128CBC-HS256", 32, 16, 16),
            ("A192CBC-HS384", 48, 16, 24),
            ("A256CBC-HS512", 64, 16, 32),
            ("A128GCM", 16, 12, 16),
            ("A192GCM", 24, 12, 16),
            ("A256GCM", 32, 12, 16),
        ];
        for (name, key_len, iv_len, tag_len) in expected {
            let params = lookup(name).unwrap();
            assert_eq!(params.key_len, key_len, "{name}");
            assert_eq!(params.iv_len, iv_len, "{name}");
            assert_eq!(params.tag_len, tag_len, "{name}");
        }
    }

    #[test]
    fn name_roundtrips_through_from_str() {
        for alg in Algorithm::ALL {
            assert_eq!(alg.name().parse::<Algorithm>().unwrap(), alg);
            assert_eq!(alg.to_string(), alg.name());
        }
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        for name in ["A128KW", "a128gcm", "", "A512GCM", "dir"] {
            match lookup(name) {
                Err(CipherError::UnsupportedAlgorithm(n)) => assert_eq!(n, name),
                other => panic!("expected UnsupportedAlgorithm, got: {other:?}"),
            }
        }
    }

    #[test]
    fn serde_uses_registered_identifier() {
        let json = serde_json::to_string(&Algorithm::A192CbcHs384).unwrap();
        assert_eq!(json, "\"A192CBC-HS384\"");
        let alg: Algorithm = serde_json::from_str("\"A256GCM\"").unwrap();
        assert_eq!(alg, Algorithm::A256Gcm);
    }
}
