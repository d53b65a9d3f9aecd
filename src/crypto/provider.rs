//! Boundary between the mode-construction layer and raw primitives.

use crate::catalog::HashVariant;
use crate::error::ProviderError;

/// Shape in which a provider's AEAD primitive exchanges ciphertext and tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadLayout {
    /// One buffer, `ciphertext || tag`.
    Combined,
    /// Ciphertext and tag as separate buffers.
    Detached,
}

/// Ciphertext and tag in one of the two provider shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AeadSealed {
    Combined(Vec<u8>),
    Detached { ciphertext: Vec<u8>, tag: Vec<u8> },
}

/// Raw primitives consumed by the AES mode constructions.
///
/// Implementations never see a content encryption key, only the raw
/// sub-keys derived from it, and are expected to be bit-exact with the
/// platform primitives of the same name.
pub trait PrimitiveProvider {
    /// AES-CBC encryption with PKCS#7 padding. The AES variant follows `key.len()`.
    fn cbc_encrypt(&self, key: &[u8], iv: &[u8], plaintext: &[u8])
    -> Result<Vec<u8>, ProviderError>;

    /// Inverse of [`cbc_encrypt`](Self::cbc_encrypt). Fails with
    /// [`ProviderError::InvalidPadding`] when the final block's trailer is malformed.
    fn cbc_decrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;

    /// Full, untruncated HMAC over `message`.
    fn hmac_sign(
        &self,
        hash: HashVariant,
        key: &[u8],
        message: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;

    fn aead_layout(&self) -> AeadLayout {
        AeadLayout::Combined
    }

    /// AES-GCM sealing with a 128-bit tag.
    fn aead_encrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<AeadSealed, ProviderError>;

    /// AES-GCM opening. `sealed` arrives in the shape reported by
    /// [`aead_layout`](Self::aead_layout). Must not return partial plaintext
    /// on [`ProviderError::Authentication`].
    fn aead_decrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        sealed: AeadSealed,
        aad: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;

    /// Fill `buf` with cryptographically secure random bytes.
    fn fill_random(&self, buf: &mut [u8]) -> Result<(), ProviderError>;
}

impl<P: PrimitiveProvider + ?Sized> PrimitiveProvider for &P {
    fn cbc_encrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        (**self).cbc_encrypt(key, iv, plaintext)
    }

    fn cbc_decrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        (**self).cbc_decrypt(key, iv, ciphertext)
    }

    fn hmac_sign(
        &self,
        hash: HashVariant,
        key: &[u8],
        message: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        (**self).hmac_sign(hash, key, message)
    }

    fn aead_layout(&self) -> AeadLayout {
        (**self).aead_layout()
    }

    fn aead_encrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<AeadSealed, ProviderError> {
        (**self).aead_encrypt(key, iv, plaintext, aad)
    }

    fn aead_decrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        sealed: AeadSealed,
        aad: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        (**self).aead_decrypt(key, iv, sealed, aad)
    }

    fn fill_random(&self, buf: &mut [u8]) -> Result<(), ProviderError> {
        (**self).fill_random(buf)
    }
}
