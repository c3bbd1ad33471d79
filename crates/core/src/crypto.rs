//! Dataset encryption: key derivation and AES-256-CBC payload handling.
//!
//! Encrypted datasets are stored as `IV (16 bytes) || ciphertext`, with the
//! plaintext PKCS#7-padded before encryption.

use std::fmt;

use aes::Aes256;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::Rng;

use crate::error::CoreError;
use crate::hashing::key_fingerprint;

type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of an AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the CBC initialization vector prepended to every payload.
pub const IV_LEN: usize = 16;

/// Development-only key used when no secret is configured. Insecure.
const DEV_KEY: &[u8; KEY_LEN] = b"dev-only-insecure-annotation-key";

// ---------------------------------------------------------------------------
// Key type
// ---------------------------------------------------------------------------

/// A validated 32-byte symmetric key.
///
/// `Debug` prints the fingerprint only, so keys can sit inside logged structs.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Log-safe fingerprint of this key.
    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.0)
    }

    /// Whether this is the built-in development key.
    pub fn is_dev_key(&self) -> bool {
        &self.0 == DEV_KEY
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncryptionKey")
            .field(&self.fingerprint())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Use an already-binary key. Must be exactly [`KEY_LEN`] bytes.
pub fn key_from_bytes(bytes: &[u8]) -> Result<EncryptionKey, CoreError> {
    let key: [u8; KEY_LEN] = bytes
        .try_into()
        .map_err(|_| CoreError::KeyLength {
            actual: bytes.len(),
        })?;
    Ok(EncryptionKey(key))
}

/// Derive the dataset key from a configured secret.
///
/// - `None` or an empty string falls back to the development key.
/// - A string whose UTF-8 bytes are exactly 32 long is used as-is.
/// - Otherwise the string is decoded as base64 or base64url (padding
///   optional) and must yield exactly 32 bytes.
pub fn derive_key(secret: Option<&str>) -> Result<EncryptionKey, CoreError> {
    let secret = match secret {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(EncryptionKey(*DEV_KEY)),
    };

    if secret.len() == KEY_LEN {
        return key_from_bytes(secret.as_bytes());
    }

    match STANDARD.decode(normalize_base64(secret)) {
        Ok(decoded) => key_from_bytes(&decoded),
        Err(_) => Err(CoreError::KeyLength {
            actual: secret.len(),
        }),
    }
}

/// Map the base64url alphabet onto standard base64 and restore padding.
fn normalize_base64(input: &str) -> String {
    let mut normalized: String = input
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }
    normalized
}

// ---------------------------------------------------------------------------
// Payload encryption / decryption
// ---------------------------------------------------------------------------

/// Decrypt an `IV || ciphertext` payload.
pub fn decrypt_payload(payload: &[u8], key: &EncryptionKey) -> Result<Vec<u8>, CoreError> {
    if payload.len() <= IV_LEN {
        return Err(CoreError::PayloadTooShort { len: payload.len() });
    }

    let (iv, ciphertext) = payload.split_at(IV_LEN);
    let decryptor = Aes256CbcDec::new_from_slices(key.as_bytes(), iv)
        .map_err(|e| CoreError::Internal(format!("cipher init: {e}")))?;

    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| CoreError::Decryption(e.to_string()))
}

/// Encrypt `plaintext` with an explicit IV, returning `IV || ciphertext`.
pub fn encrypt_payload(
    plaintext: &[u8],
    key: &EncryptionKey,
    iv: &[u8; IV_LEN],
) -> Result<Vec<u8>, CoreError> {
    let encryptor = Aes256CbcEnc::new_from_slices(key.as_bytes(), iv)
        .map_err(|e| CoreError::Internal(format!("cipher init: {e}")))?;

    let ciphertext = encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Encrypt `plaintext` under a fresh random IV.
pub fn seal_payload(plaintext: &[u8], key: &EncryptionKey) -> Result<Vec<u8>, CoreError> {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill(&mut iv);
    encrypt_payload(plaintext, key, &iv)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};

    fn sample_key_bytes() -> [u8; KEY_LEN] {
        let mut bytes = [0u8; KEY_LEN];
        for (i, b) in bytes.iter_mut().enumerate() {
            // Includes 0xfb..0xff so the encodings exercise '+', '/', '-', '_'.
            *b = (i as u8).wrapping_mul(37).wrapping_add(0xfb);
        }
        bytes
    }

    // -- key_from_bytes ----------------------------------------------------

    #[test]
    fn binary_key_is_returned_unchanged() {
        let bytes = sample_key_bytes();
        let key = key_from_bytes(&bytes).unwrap();
        assert_eq!(key.as_bytes(), &bytes);
    }

    #[test]
    fn binary_key_wrong_length_rejected() {
        assert_matches!(
            key_from_bytes(&[0u8; 31]),
            Err(CoreError::KeyLength { actual: 31 })
        );
        assert_matches!(
            key_from_bytes(&[0u8; 33]),
            Err(CoreError::KeyLength { actual: 33 })
        );
    }

    // -- derive_key --------------------------------------------------------

    #[test]
    fn missing_secret_uses_dev_key() {
        assert!(derive_key(None).unwrap().is_dev_key());
        assert!(derive_key(Some("")).unwrap().is_dev_key());
    }

    #[test]
    fn raw_utf8_secret_of_32_bytes_used_directly() {
        let secret = "0123456789abcdef0123456789abcdef";
        let key = derive_key(Some(secret)).unwrap();
        assert_eq!(key.as_bytes(), secret.as_bytes());
    }

    #[test]
    fn padded_base64_secret_decoded() {
        let bytes = sample_key_bytes();
        let encoded = STANDARD.encode(bytes);
        assert_eq!(derive_key(Some(&encoded)).unwrap().as_bytes(), &bytes);
    }

    #[test]
    fn unpadded_base64_secret_decoded() {
        let bytes = sample_key_bytes();
        let encoded = STANDARD_NO_PAD.encode(bytes);
        assert_eq!(derive_key(Some(&encoded)).unwrap().as_bytes(), &bytes);
    }

    #[test]
    fn base64url_secret_decoded() {
        let bytes = sample_key_bytes();
        let encoded = URL_SAFE_NO_PAD.encode(bytes);
        assert!(encoded.contains('-') || encoded.contains('_'));
        assert_eq!(derive_key(Some(&encoded)).unwrap().as_bytes(), &bytes);
    }

    #[test]
    fn base64_of_wrong_length_rejected() {
        let encoded = STANDARD.encode([1u8; 16]);
        assert_matches!(
            derive_key(Some(&encoded)),
            Err(CoreError::KeyLength { actual: 16 })
        );
    }

    #[test]
    fn garbage_secret_rejected() {
        assert_matches!(
            derive_key(Some("not a key!")),
            Err(CoreError::KeyLength { .. })
        );
    }

    #[test]
    fn debug_output_hides_key_bytes() {
        let key = derive_key(Some("0123456789abcdef0123456789abcdef")).unwrap();
        let debug = format!("{key:?}");
        assert!(!debug.contains("0123456789abcdef"));
        assert!(debug.contains(&key.fingerprint()));
    }

    // -- decrypt_payload ---------------------------------------------------

    #[test]
    fn round_trip_with_fixed_iv() {
        let key = key_from_bytes(&sample_key_bytes()).unwrap();
        let iv = [9u8; IV_LEN];
        let plaintext = br#"{"boundaries":[]}"#;

        let sealed = encrypt_payload(plaintext, &key, &iv).unwrap();
        assert_eq!(&sealed[..IV_LEN], &iv);
        assert_eq!((sealed.len() - IV_LEN) % 16, 0);

        assert_eq!(decrypt_payload(&sealed, &key).unwrap(), plaintext);
    }

    #[test]
    fn round_trip_with_random_iv() {
        let key = derive_key(None).unwrap();
        let plaintext = "領域 data".as_bytes();
        let sealed = seal_payload(plaintext, &key).unwrap();
        assert_eq!(decrypt_payload(&sealed, &key).unwrap(), plaintext);
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = derive_key(None).unwrap();
        let sealed = encrypt_payload(b"", &key, &[0u8; IV_LEN]).unwrap();
        assert_eq!(sealed.len(), IV_LEN + 16);
        assert!(decrypt_payload(&sealed, &key).unwrap().is_empty());
    }

    #[test]
    fn payload_of_iv_length_is_too_short() {
        let key = derive_key(None).unwrap();
        assert_matches!(
            decrypt_payload(&[0u8; IV_LEN], &key),
            Err(CoreError::PayloadTooShort { len: 16 })
        );
        assert_matches!(
            decrypt_payload(&[], &key),
            Err(CoreError::PayloadTooShort { len: 0 })
        );
    }

    #[test]
    fn truncated_ciphertext_fails_to_decrypt() {
        let key = derive_key(None).unwrap();
        let sealed = encrypt_payload(b"some dataset bytes", &key, &[3u8; IV_LEN]).unwrap();
        let truncated = &sealed[..sealed.len() - 5];
        assert_matches!(decrypt_payload(truncated, &key), Err(CoreError::Decryption(_)));
    }

    #[test]
    fn wrong_key_error_hints_at_key_mismatch() {
        let right = key_from_bytes(&[1u8; KEY_LEN]).unwrap();
        let wrong = key_from_bytes(&[2u8; KEY_LEN]).unwrap();
        let plaintext = br#"{"boundaries":[{"polygon":{"vertices":[]}}]}"#;
        let sealed = encrypt_payload(plaintext, &right, &[5u8; IV_LEN]).unwrap();

        match decrypt_payload(&sealed, &wrong) {
            Err(err @ CoreError::Decryption(_)) => {
                assert!(err.to_string().contains("ANNOTATION_DATASET_KEY"));
            }
            // A wrong key can occasionally unpad cleanly; it must not yield
            // the original plaintext.
            Ok(garbage) => assert_ne!(garbage, plaintext),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
