//! Audit detail encryption
//!
//! The recorder depends only on [`AuditCipher`]; the default implementation
//! is XChaCha20-Poly1305 with a random 192-bit nonce per record, which makes
//! nonce reuse under a single long-lived key a non-issue.

use base64::{engine::general_purpose, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use std::fmt;
use zeroize::Zeroize;

use crate::error::AuditError;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 24;

/// Symmetric authenticated encryption of audit details
pub trait AuditCipher: Send + Sync + 'static {
    /// Encrypts `plaintext`; the output carries everything `open` needs
    /// besides the key
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, AuditError>;

    /// Decrypts and authenticates the output of `seal`
    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, AuditError>;
}

/// 256-bit audit encryption key, wiped on drop
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct AuditKey([u8; KEY_LEN]);

impl AuditKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Decodes a standard base64 key as supplied by configuration
    pub fn from_base64(encoded: &str) -> Result<Self, AuditError> {
        let mut decoded = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| AuditError::InvalidKey(e.to_string()))?;

        if decoded.len() != KEY_LEN {
            let len = decoded.len();
            decoded.zeroize();
            return Err(AuditError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_LEN, len
            )));
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self(bytes))
    }

    /// Generates a random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Encodes the key as standard base64, for provisioning
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for AuditKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuditKey(..)")
    }
}

/// XChaCha20-Poly1305 cipher; output is `nonce || ciphertext`
pub struct XChaChaAuditCipher {
    cipher: XChaCha20Poly1305,
}

impl XChaChaAuditCipher {
    pub fn new(key: &AuditKey) -> Self {
        Self {
            cipher: XChaCha20Poly1305::new(key.as_bytes().into()),
        }
    }
}

impl fmt::Debug for XChaChaAuditCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("XChaChaAuditCipher { .. }")
    }
}

impl AuditCipher for XChaChaAuditCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, AuditError> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|e| AuditError::Cipher(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, AuditError> {
        if sealed.len() < NONCE_LEN {
            return Err(AuditError::Cipher("sealed payload shorter than nonce".to_string()));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        self.cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|e| AuditError::Cipher(e.to_string()))
    }
}
