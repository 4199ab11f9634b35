//! Vendor credential encryption using AES-256-GCM
//!
//! Authenticated encryption gives confidentiality and tamper-evidence
//! together: a decryption that does not verify fails outright instead of
//! yielding a wrong plaintext. Blob layout is `base64(nonce ‖ ciphertext ‖
//! tag)`, a stable on-disk format; rotating the master secret invalidates
//! every previously stored credential.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::error;

use crate::domain::EncryptionError;

/// AES-256 key size in bytes
const KEY_SIZE: usize = 32;
/// Recommended GCM nonce size
const NONCE_SIZE: usize = 12;
/// Full GCM authentication tag size
const TAG_SIZE: usize = 16;

/// Encrypts and decrypts vendor API credentials.
///
/// Pure after construction and safe for unsynchronized concurrent use.
#[derive(Clone)]
pub struct CredentialEncryption {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CredentialEncryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialEncryption")
            .field("cipher", &"[hidden]")
            .finish()
    }
}

impl CredentialEncryption {
    /// Create from the configured master secret.
    ///
    /// The secret is stretched to a fixed 256-bit key with SHA-256 so any
    /// length of secret yields a valid AES-256 key.
    pub fn new(secret: &str) -> Self {
        let key_bytes: [u8; KEY_SIZE] = Sha256::digest(secret.as_bytes()).into();
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));

        Self { cipher }
    }

    /// Encrypt a plaintext credential into a base64 blob.
    ///
    /// A fresh random 96-bit nonce is generated per call; the same
    /// plaintext therefore encrypts to a different blob every time.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        if plaintext.is_empty() {
            return Err(EncryptionError::EmptyInput);
        }

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        // encrypt() appends the 16-byte tag to the ciphertext
        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| EncryptionError::Decryption)?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        Ok(BASE64.encode(blob))
    }

    /// Decrypt a base64 blob back into the plaintext credential.
    ///
    /// Fails on truncation, a wrong key, or any tampering (tag mismatch).
    pub fn decrypt(&self, encrypted: &str) -> Result<String, EncryptionError> {
        if encrypted.is_empty() {
            return Err(EncryptionError::Decryption);
        }

        let data = BASE64.decode(encrypted).map_err(|e| {
            error!("Failed to decode encrypted credential: {}", e);
            EncryptionError::Decryption
        })?;

        if data.len() < NONCE_SIZE + TAG_SIZE {
            error!("Encrypted credential too short: {} bytes", data.len());
            return Err(EncryptionError::Decryption);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| EncryptionError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| EncryptionError::Decryption)
    }

    /// Structural check for whether a value looks like an encrypted blob.
    ///
    /// Only a length heuristic on the decoded bytes, not a correctness
    /// guarantee.
    pub fn is_encrypted(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }

        match BASE64.decode(candidate) {
            Ok(decoded) => decoded.len() >= NONCE_SIZE + TAG_SIZE,
            Err(_) => false,
        }
    }
}
