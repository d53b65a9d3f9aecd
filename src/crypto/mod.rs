//! AES mode constructions.
//!
//! Provides the CBC-HMAC composite cipher, the native GCM cipher, the
//! primitive provider boundary they share, and a default software provider.

pub mod cbc_hmac;
pub mod gcm;
pub mod provider;
pub mod rustcrypto;

pub use cbc_hmac::CbcHmac;
pub use gcm::Gcm;
pub use provider::{AeadLayout, AeadSealed, PrimitiveProvider};
pub use rustcrypto::RustCryptoProvider;

use tracing::debug;
use zeroize::Zeroizing;

use crate::catalog::{Construction, Params};
use crate::error::{CipherError, Result};

/// AES block length (16 bytes).
pub const BLOCK_LEN: usize = 16;
/// Length of a GCM nonce (12 bytes).
pub const GCM_NONCE_LEN: usize = 12;
/// Length of a GCM tag (16 bytes / 128 bits).
pub const GCM_TAG_LEN: usize = 16;

pub(crate) fn check_key_len(expected: usize, cek: &[u8]) -> Result<()> {
    if cek.len() != expected {
        debug!(expected, actual = cek.len(), "rejecting CEK");
        return Err(CipherError::InvalidKeyLength {
            expected,
            actual: cek.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_iv_len(expected: usize, iv: &[u8]) -> Result<()> {
    if iv.len() != expected {
        debug!(expected, actual = iv.len(), "rejecting IV");
        return Err(CipherError::InvalidIvLength {
            expected,
            actual: iv.len(),
        });
    }
    Ok(())
}

/// One of the two constructions, selected purely from catalog parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cipher {
    CbcHmac(CbcHmac),
    Gcm(Gcm),
}

impl Cipher {
    pub fn for_params(params: &Params) -> Self {
        match params.construction {
            Construction::CbcHmac {
                mac_key_len,
                enc_key_len,
                hash,
            } => Cipher::CbcHmac(CbcHmac::new(mac_key_len, enc_key_len, hash)),
            Construction::Gcm => Cipher::Gcm(Gcm::new(params.key_len)),
        }
    }

    pub fn key_len(&self) -> usize {
        match self {
            Cipher::CbcHmac(c) => c.key_len(),
            Cipher::Gcm(c) => c.key_len(),
        }
    }

    pub fn tag_len(&self) -> usize {
        match self {
            Cipher::CbcHmac(c) => c.tag_len(),
            Cipher::Gcm(c) => c.tag_len(),
        }
    }

    /// Key length check alone, for callers that must reject a bad key
    /// before drawing an IV.
    pub fn check_key(&self, cek: &[u8]) -> Result<()> {
        check_key_len(self.key_len(), cek)
    }

    /// Returns `(ciphertext, tag)`.
    pub fn encrypt<P: PrimitiveProvider + ?Sized>(
        &self,
        provider: &P,
        cek: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        match self {
            Cipher::CbcHmac(c) => c.encrypt(provider, cek, iv, plaintext, aad),
            Cipher::Gcm(c) => c.encrypt(provider, cek, iv, plaintext, aad),
        }
    }

    pub fn decrypt<P: PrimitiveProvider + ?Sized>(
        &self,
        provider: &P,
        cek: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Cipher::CbcHmac(c) => c.decrypt(provider, cek, iv, ciphertext, tag, aad),
            Cipher::Gcm(c) => c.decrypt(provider, cek, iv, ciphertext, tag, aad),
        }
    }
}
