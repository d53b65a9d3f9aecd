//! AES-CBC + HMAC-SHA2 encrypt-then-MAC (RFC 7518, section 5.2).
//!
//! Content encryption key layout:
//! ```text
//! MAC_KEY (mac_key_len) | ENC_KEY (enc_key_len)
//! ```
//!
//! MAC input layout:
//! ```text
//! AAD | IV | CIPHERTEXT | AL (8, big-endian bit length of AAD)
//! ```
//!
//! The tag is the first `enc_key_len` bytes of the HMAC output.

use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

use super::{BLOCK_LEN, check_iv_len, check_key_len};
use super::provider::PrimitiveProvider;
use crate::catalog::HashVariant;
use crate::error::{CipherError, ProviderError, Result};

/// Length of the AAD bit-length suffix.
const AL_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CbcHmac {
    mac_key_len: usize,
    enc_key_len: usize,
    hash: HashVariant,
}

/// Builds the HMAC input `AAD || IV || ciphertext || AL`.
pub fn mac_input(aad: &[u8], iv: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    let aad_bits = (aad.len() as u64) * 8;

    let mut buf = Vec::with_capacity(aad.len() + iv.len() + ciphertext.len() + AL_LEN);
    buf.extend_from_slice(aad);
    buf.extend_from_slice(iv);
    buf.extend_from_slice(ciphertext);
    buf.extend_from_slice(&aad_bits.to_be_bytes());
    buf
}

impl CbcHmac {
    pub fn new(mac_key_len: usize, enc_key_len: usize, hash: HashVariant) -> Self {
        Self {
            mac_key_len,
            enc_key_len,
            hash,
        }
    }

    pub fn key_len(&self) -> usize {
        self.mac_key_len + self.enc_key_len
    }

    pub fn tag_len(&self) -> usize {
        self.enc_key_len
    }

    /// Splits the CEK into `(mac_key, enc_key)`.
    fn split_key<'k>(&self, cek: &'k [u8]) -> Result<(&'k [u8], &'k [u8])> {
        check_key_len(self.key_len(), cek)?;
        Ok(cek.split_at(self.mac_key_len))
    }

    fn tag<P: PrimitiveProvider + ?Sized>(
        &self,
        provider: &P,
        mac_key: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let message = mac_input(aad, iv, ciphertext);
        let mut digest = provider.hmac_sign(self.hash, mac_key, &message)?;
        if digest.len() < self.tag_len() {
            return Err(CipherError::Provider(ProviderError::InvalidInput(format!(
                "HMAC output of {} bytes is shorter than the {}-byte tag",
                digest.len(),
                self.tag_len()
            ))));
        }
        digest.truncate(self.tag_len());
        Ok(digest)
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
        let (mac_key, enc_key) = self.split_key(cek)?;
        check_iv_len(BLOCK_LEN, iv)?;

        let ciphertext = provider.cbc_encrypt(enc_key, iv, plaintext)?;
        let tag = self.tag(provider, mac_key, iv, &ciphertext, aad)?;

        Ok((ciphertext, tag))
    }

    /// Verifies the tag before touching the ciphertext.
    ///
    /// # Errors
    ///
    /// Tag mismatch and malformed padding both yield
    /// [`CipherError::AuthenticationFailed`].
    pub fn decrypt<P: PrimitiveProvider + ?Sized>(
        &self,
        provider: &P,
        cek: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        let (mac_key, enc_key) = self.split_key(cek)?;
        check_iv_len(BLOCK_LEN, iv)?;
        if tag.len() != self.tag_len() {
            debug!(tag_len = tag.len(), "CBC-HMAC tag has wrong length");
            return Err(CipherError::AuthenticationFailed);
        }

        let expected = self.tag(provider, mac_key, iv, ciphertext, aad)?;
        if !bool::from(expected.as_slice().ct_eq(tag)) {
            debug!(hash = ?self.hash, "CBC-HMAC tag mismatch");
            return Err(CipherError::AuthenticationFailed);
        }

        let plaintext = provider.cbc_decrypt(enc_key, iv, ciphertext)?;
        Ok(Zeroizing::new(plaintext))
    }
}
