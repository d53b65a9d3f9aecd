//! AES-GCM adapter.
//!
//! The provider may hand back `ciphertext || tag` as one buffer or as a
//! detached pair; callers always see the detached pair.

use tracing::debug;
use zeroize::Zeroizing;

use super::provider::{AeadLayout, AeadSealed, PrimitiveProvider};
use super::{GCM_NONCE_LEN, GCM_TAG_LEN, check_iv_len, check_key_len};
use crate::error::{CipherError, ProviderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gcm {
    key_len: usize,
}

fn split_sealed(sealed: AeadSealed) -> Result<(Vec<u8>, Vec<u8>)> {
    match sealed {
        AeadSealed::Combined(mut buf) => {
            if buf.len() < GCM_TAG_LEN {
                return Err(CipherError::Provider(ProviderError::InvalidInput(format!(
                    "sealed output of {} bytes cannot hold a {GCM_TAG_LEN}-byte tag",
                    buf.len()
                ))));
            }
            let tag = buf.split_off(buf.len() - GCM_TAG_LEN);
            Ok((buf, tag))
        }
        AeadSealed::Detached { ciphertext, tag } => {
            if tag.len() != GCM_TAG_LEN {
                return Err(CipherError::Provider(ProviderError::InvalidInput(format!(
                    "provider returned a {}-byte tag",
                    tag.len()
                ))));
            }
            Ok((ciphertext, tag))
        }
    }
}

fn join_sealed(layout: AeadLayout, ciphertext: &[u8], tag: &[u8]) -> AeadSealed {
    match layout {
        AeadLayout::Combined => {
            let mut buf = Vec::with_capacity(ciphertext.len() + tag.len());
            buf.extend_from_slice(ciphertext);
            buf.extend_from_slice(tag);
            AeadSealed::Combined(buf)
        }
        AeadLayout::Detached => AeadSealed::Detached {
            ciphertext: ciphertext.to_vec(),
            tag: tag.to_vec(),
        },
    }
}

impl Gcm {
    pub fn new(key_len: usize) -> Self {
        Self { key_len }
    }

    pub fn key_len(&self) -> usize {
        self.key_len
    }

    pub fn tag_len(&self) -> usize {
        GCM_TAG_LEN
    }

    fn check_inputs(&self, cek: &[u8], iv: &[u8]) -> Result<()> {
        check_key_len(self.key_len, cek)?;
        check_iv_len(GCM_NONCE_LEN, iv)
    }

    /// Returns `(ciphertext, tag)`; the ciphertext is as long as the plaintext.
    pub fn encrypt<P: PrimitiveProvider + ?Sized>(
        &self,
        provider: &P,
        cek: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        self.check_inputs(cek, iv)?;

        let sealed = provider.aead_encrypt(cek, iv, plaintext, aad)?;
        split_sealed(sealed)
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
        self.check_inputs(cek, iv)?;
        if tag.len() != self.tag_len() {
            debug!(tag_len = tag.len(), "GCM tag has wrong length");
            return Err(CipherError::AuthenticationFailed);
        }

        let sealed = join_sealed(provider.aead_layout(), ciphertext, tag);
        let plaintext = provider.aead_decrypt(cek, iv, sealed, aad).map_err(|e| {
            if e == ProviderError::Authentication {
                debug!("GCM tag rejected");
            }
            CipherError::from(e)
        })?;

        Ok(Zeroizing::new(plaintext))
    }
}
