pub mod catalog;
pub mod crypto;
mod error;

pub use crate::catalog::{Algorithm, Construction, HashVariant, Params};
pub use crate::crypto::{AeadLayout, AeadSealed, PrimitiveProvider, RustCryptoProvider};
pub use crate::error::{CipherError, ProviderError, Result};

use crate::crypto::Cipher;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

/// Output of [`AesCipher::encrypt`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptResult {
    #[serde(with = "hex::serde")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub tag: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub iv: Vec<u8>,
}

/// Mode-agnostic AES content encryption over an injected primitive provider.
#[derive(Debug, Clone, Default)]
pub struct AesCipher<P = RustCryptoProvider> {
    provider: P,
}

impl<P: PrimitiveProvider> AesCipher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn key_byte_length(&self, alg: Algorithm) -> usize {
        alg.params().key_len
    }

    pub fn iv_byte_length(&self, alg: Algorithm) -> usize {
        alg.params().iv_len
    }

    pub fn tag_byte_length(&self, alg: Algorithm) -> usize {
        alg.params().tag_len
    }

    /// Fresh random content encryption key sized for `alg`.
    pub fn generate_key(&self, alg: Algorithm) -> Result<Zeroizing<Vec<u8>>> {
        let mut cek = Zeroizing::new(vec![0u8; self.key_byte_length(alg)]);
        self.provider.fill_random(&mut cek)?;
        Ok(cek)
    }

    /// Fresh random IV sized for `alg`.
    pub fn generate_iv(&self, alg: Algorithm) -> Result<Vec<u8>> {
        let mut iv = vec![0u8; self.iv_byte_length(alg)];
        self.provider.fill_random(&mut iv)?;
        Ok(iv)
    }

    /// Encrypts `plaintext` and authenticates it together with `aad`.
    ///
    /// A fresh IV is drawn from the provider when `iv` is `None`.
    ///
    /// # Errors
    ///
    /// - [`CipherError::InvalidKeyLength`] / [`CipherError::InvalidIvLength`]
    ///   before any primitive is invoked
    /// - [`CipherError::Provider`] when a primitive fails
    pub fn encrypt(
        &self,
        alg: Algorithm,
        cek: &[u8],
        plaintext: &[u8],
        aad: &[u8],
        iv: Option<&[u8]>,
    ) -> Result<EncryptResult> {
        // Sizes are validated by the construction; only a generated IV
        // needs the key checked up front so no randomness is drawn for it.
        let cipher = Cipher::for_params(&alg.params());
        let iv = match iv {
            Some(iv) => iv.to_vec(),
            None => {
                cipher.check_key(cek)?;
                self.generate_iv(alg)?
            }
        };

        debug!(
            %alg,
            plaintext_len = plaintext.len(),
            aad_len = aad.len(),
            "encrypting"
        );
        let (ciphertext, tag) = cipher.encrypt(&self.provider, cek, &iv, plaintext, aad)?;
        debug!(%alg, ciphertext_len = ciphertext.len(), "encryption completed");

        Ok(EncryptResult {
            ciphertext,
            tag,
            iv,
        })
    }

    /// Verifies `tag` and decrypts `ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::AuthenticationFailed`] for any integrity
    /// failure; no plaintext is released in that case.
    pub fn decrypt(
        &self,
        alg: Algorithm,
        cek: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        iv: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        debug!(
            %alg,
            ciphertext_len = ciphertext.len(),
            aad_len = aad.len(),
            "decrypting"
        );
        let plaintext = Cipher::for_params(&alg.params()).decrypt(
            &self.provider,
            cek,
            iv,
            ciphertext,
            tag,
            aad,
        )?;
        debug!(%alg, plaintext_len = plaintext.len(), "decryption completed");

        Ok(plaintext)
    }
}
