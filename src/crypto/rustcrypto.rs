//! Software primitive provider built on the RustCrypto crates.

use aes::{Aes128, Aes192, Aes256};
use aes_gcm::{
    Aes128Gcm, Aes256Gcm, AesGcm,
    aead::{Aead, KeyInit, Nonce, Payload, consts::U12},
};
use cbc::cipher::{
    BlockDecryptMut, BlockEncryptMut, InvalidLength, KeyIvInit, block_padding::Pkcs7,
};
use getrandom::fill;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use super::provider::{AeadLayout, AeadSealed, PrimitiveProvider};
use super::{BLOCK_LEN, GCM_NONCE_LEN, GCM_TAG_LEN};
use crate::catalog::HashVariant;
use crate::error::ProviderError;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Pure-Rust provider. AEAD output is exchanged as one `ciphertext || tag` buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

fn unsupported_key(len: usize) -> ProviderError {
    ProviderError::InvalidKey(format!("no AES variant takes a {len}-byte key"))
}

fn check_cbc_iv(iv: &[u8]) -> Result<(), ProviderError> {
    if iv.len() != BLOCK_LEN {
        return Err(ProviderError::InvalidInput(format!(
            "CBC IV must be {BLOCK_LEN} bytes, got {}",
            iv.len()
        )));
    }
    Ok(())
}

fn check_gcm_nonce(iv: &[u8]) -> Result<(), ProviderError> {
    if iv.len() != GCM_NONCE_LEN {
        return Err(ProviderError::InvalidInput(format!(
            "GCM nonce must be {GCM_NONCE_LEN} bytes, got {}",
            iv.len()
        )));
    }
    Ok(())
}

fn gcm_seal<C: Aead + KeyInit>(
    key: &[u8],
    iv: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, ProviderError> {
    let cipher = C::new_from_slice(key).map_err(|_| unsupported_key(key.len()))?;
    cipher
        .encrypt(
            Nonce::<C>::from_slice(iv),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| ProviderError::InvalidInput("GCM encryption failed".into()))
}

fn gcm_open<C: Aead + KeyInit>(
    key: &[u8],
    iv: &[u8],
    combined: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, ProviderError> {
    let cipher = C::new_from_slice(key).map_err(|_| unsupported_key(key.len()))?;
    cipher
        .decrypt(
            Nonce::<C>::from_slice(iv),
            Payload { msg: combined, aad },
        )
        .map_err(|_| ProviderError::Authentication)
}

fn hmac_digest<M: Mac + KeyInit>(key: &[u8], message: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|_| ProviderError::InvalidKey("HMAC key rejected".into()))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

impl PrimitiveProvider for RustCryptoProvider {
    fn cbc_encrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        check_cbc_iv(iv)?;
        let invalid = |_: InvalidLength| unsupported_key(key.len());

        let ciphertext = match key.len() {
            16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
                .map_err(invalid)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            24 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)
                .map_err(invalid)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            32 => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
                .map_err(invalid)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            n => return Err(unsupported_key(n)),
        };

        Ok(ciphertext)
    }

    fn cbc_decrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        check_cbc_iv(iv)?;
        // a truncated final block is indistinguishable from a bad trailer
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(ProviderError::InvalidPadding);
        }
        let invalid = |_: InvalidLength| unsupported_key(key.len());

        let plaintext = match key.len() {
            16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
                .map_err(invalid)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
            24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
                .map_err(invalid)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
            32 => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
                .map_err(invalid)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
            n => return Err(unsupported_key(n)),
        };

        plaintext.map_err(|_| ProviderError::InvalidPadding)
    }

    fn hmac_sign(
        &self,
        hash: HashVariant,
        key: &[u8],
        message: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        match hash {
            HashVariant::Sha256 => hmac_digest::<Hmac<Sha256>>(key, message),
            HashVariant::Sha384 => hmac_digest::<Hmac<Sha384>>(key, message),
            HashVariant::Sha512 => hmac_digest::<Hmac<Sha512>>(key, message),
        }
    }

    fn aead_layout(&self) -> AeadLayout {
        AeadLayout::Combined
    }

    fn aead_encrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<AeadSealed, ProviderError> {
        check_gcm_nonce(iv)?;

        let combined = match key.len() {
            16 => gcm_seal::<Aes128Gcm>(key, iv, plaintext, aad)?,
            24 => gcm_seal::<Aes192Gcm>(key, iv, plaintext, aad)?,
            32 => gcm_seal::<Aes256Gcm>(key, iv, plaintext, aad)?,
            n => return Err(unsupported_key(n)),
        };

        Ok(AeadSealed::Combined(combined))
    }

    fn aead_decrypt(
        &self,
        key: &[u8],
        iv: &[u8],
        sealed: AeadSealed,
        aad: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        check_gcm_nonce(iv)?;

        let combined = match sealed {
            AeadSealed::Combined(buf) => buf,
            AeadSealed::Detached { mut ciphertext, tag } => {
                ciphertext.extend_from_slice(&tag);
                ciphertext
            }
        };
        if combined.len() < GCM_TAG_LEN {
            return Err(ProviderError::Authentication);
        }

        match key.len() {
            16 => gcm_open::<Aes128Gcm>(key, iv, &combined, aad),
            24 => gcm_open::<Aes192Gcm>(key, iv, &combined, aad),
            32 => gcm_open::<Aes256Gcm>(key, iv, &combined, aad),
            n => Err(unsupported_key(n)),
        }
    }

    fn fill_random(&self, buf: &mut [u8]) -> Result<(), ProviderError> {
        fill(buf).map_err(|e| ProviderError::Random(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbc_always_adds_padding() {
        let p = RustCryptoProvider;
        let key = [7u8; 16];
        let iv = [9u8; 16];

        assert_eq!(p.cbc_encrypt(&key, &iv, &[]).unwrap().len(), 16);
        assert_eq!(p.cbc_encrypt(&key, &iv, &[0u8; 15]).unwrap().len(), 16);
        assert_eq!(p.cbc_encrypt(&key, &iv, &[0u8; 16]).unwrap().len(), 32);
    }

    #[test]
    fn cbc_roundtrip_for_every_key_size() {
        let p = RustCryptoProvider;
        let iv = [1u8; 16];
        for len in [16, 24, 32] {
            let key = vec![0x33u8; len];
            let ct = p.cbc_encrypt(&key, &iv, b"attack at dawn").unwrap();
            let pt = p.cbc_decrypt(&key, &iv, &ct).unwrap();
            assert_eq!(pt, b"attack at dawn");
        }
    }

    #[test]
    fn cbc_decrypt_rejects_bad_trailer() {
        let p = RustCryptoProvider;
        let key = [7u8; 16];
        let iv = [9u8; 16];
        let ct = p.cbc_encrypt(&key, &iv, b"hi").unwrap();
        // trailer byte 0x0e becomes 0xf1
        let mut bad_iv = iv;
        bad_iv[15] ^= 0xff;
        assert_eq!(
            p.cbc_decrypt(&key, &bad_iv, &ct),
            Err(ProviderError::InvalidPadding)
        );
    }

    #[test]
    fn cbc_decrypt_rejects_unaligned_input() {
        let p = RustCryptoProvider;
        let key = [7u8; 16];
        let iv = [9u8; 16];
        assert_eq!(
            p.cbc_decrypt(&key, &iv, &[0u8; 17]),
            Err(ProviderError::InvalidPadding)
        );
        assert_eq!(
            p.cbc_decrypt(&key, &iv, &[]),
            Err(ProviderError::InvalidPadding)
        );
    }

    #[test]
    fn cbc_rejects_odd_key_size() {
        let p = RustCryptoProvider;
        match p.cbc_encrypt(&[0u8; 20], &[0u8; 16], b"x") {
            Err(ProviderError::InvalidKey(_)) => {}
            other => panic!("expected InvalidKey, got: {other:?}"),
        }
    }

    #[test]
    fn hmac_output_has_full_digest_length() {
        let p = RustCryptoProvider;
        for hash in [HashVariant::Sha256, HashVariant::Sha384, HashVariant::Sha512] {
            let tag = p.hmac_sign(hash, b"key", b"message").unwrap();
            assert_eq!(tag.len(), hash.digest_len());
        }
    }

    #[test]
    fn gcm_nist_test_case_1_and_2() {
        let p = RustCryptoProvider;
        let key = [0u8; 16];
        let iv = [0u8; 12];

        let sealed = p.aead_encrypt(&key, &iv, &[], &[]).unwrap();
        assert_eq!(
            sealed,
            AeadSealed::Combined(hex::decode("58e2fccefa7e3061367f1d57a4e7455a").unwrap())
        );

        let sealed = p.aead_encrypt(&key, &iv, &[0u8; 16], &[]).unwrap();
        assert_eq!(
            sealed,
            AeadSealed::Combined(
                hex::decode("0388dace60b6a392f328c2b971b2fe78ab6e47d42cec13bdf53a67b21257bddf")
                    .unwrap()
            )
        );
    }

    #[test]
    fn gcm_accepts_detached_input() {
        let p = RustCryptoProvider;
        let key = [5u8; 24];
        let iv = [6u8; 12];
        let AeadSealed::Combined(buf) = p.aead_encrypt(&key, &iv, b"data", b"aad").unwrap() else {
            panic!("expected combined output");
        };
        let (ct, tag) = buf.split_at(buf.len() - GCM_TAG_LEN);
        let sealed = AeadSealed::Detached {
            ciphertext: ct.to_vec(),
            tag: tag.to_vec(),
        };
        assert_eq!(p.aead_decrypt(&key, &iv, sealed, b"aad").unwrap(), b"data");
    }

    #[test]
    fn gcm_rejects_wrong_aad() {
        let p = RustCryptoProvider;
        let key = [5u8; 32];
        let iv = [6u8; 12];
        let sealed = p.aead_encrypt(&key, &iv, b"data", b"aad").unwrap();
        assert_eq!(
            p.aead_decrypt(&key, &iv, sealed, b"other"),
            Err(ProviderError::Authentication)
        );
    }

    #[test]
    fn gcm_rejects_short_nonce() {
        let p = RustCryptoProvider;
        match p.aead_encrypt(&[0u8; 16], &[0u8; 8], b"x", b"") {
            Err(ProviderError::InvalidInput(_)) => {}
            other => panic!("expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn random_fills_buffer() {
        let p = RustCryptoProvider;
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        p.fill_random(&mut a).unwrap();
        p.fill_random(&mut b).unwrap();
        assert_ne!(a, b);
    }
}
