use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

/// Argon2id parameters for key derivation.
/// Written into the file header so existing files keep opening if the
/// defaults change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    pub memory_cost: u32,
    /// Number of iterations (default: 2)
    pub time_cost: u32,
    /// Degree of parallelism (default: 1)
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 19_456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// AES-256-GCM cipher bound to a key derived once from a password.
///
/// The key is derived when a store is opened and reused for every write;
/// each `seal` draws a fresh nonce.
pub struct Cipher {
    inner: Aes256Gcm,
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Cipher(<redacted>)")
    }
}

impl Cipher {
    /// Derive a 256-bit key with Argon2id and build the cipher.
    pub fn derive(password: &str, salt: &[u8; 16], params: &KdfParams) -> Result<Self, CoreError> {
        let argon2_params = Params::new(
            params.memory_cost,
            params.time_cost,
            params.parallelism,
            Some(32),
        )
        .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

        let mut key = [0u8; 32];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;

        let inner = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
        key.fill(0);
        Ok(Self { inner })
    }

    /// Encrypt under a fresh random nonce. Returns `(nonce, ciphertext+tag)`.
    pub fn seal(&self, plaintext: &[u8]) -> Result<([u8; 12], Vec<u8>), CoreError> {
        let nonce = random_bytes::<12>()?;
        let ciphertext = self
            .inner
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))?;
        Ok((nonce, ciphertext))
    }

    /// Decrypt and authenticate. A wrong password and a tampered file both
    /// surface as `CoreError::Decryption`.
    pub fn open(&self, nonce: &[u8; 12], ciphertext: &[u8]) -> Result<Vec<u8>, CoreError> {
        Ok(self.inner.decrypt(Nonce::from_slice(nonce), ciphertext)?)
    }
}

/// Cryptographically secure random bytes (salts, nonces).
pub fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| CoreError::Encryption(format!("Failed to gather randomness: {e}")))?;
    Ok(buf)
}
