//! Password-encrypted persistence for identity tables
//!
//! Blob layout (all integers little endian):
//!
//! ```text
//! magic "EMRDEID1" | version u8 | m_cost u32 | t_cost u32 | p_cost u32
//! | salt [16] | nonce [12] | ciphertext + tag
//! ```
//!
//! The key is derived from the password with Argon2id using the salt and cost
//! parameters stored in the header. The serialized table is sealed with
//! ChaCha20-Poly1305 and the whole header is bound as associated data, so a
//! wrong password and a tampered blob fail the same way.

use super::table::IdentityTable;
use crate::adapters::csv_io::write_bytes;
use crate::config::SecretString;
use crate::domain::{EmrError, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::ExposeSecret;
use std::path::Path;
use zeroize::Zeroizing;

const MAGIC: &[u8; 8] = b"EMRDEID1";
const FORMAT_VERSION: u8 = 1;
const SALT_SIZE: usize = 16;
const NONCE_SIZE: usize = 12;
const KEY_SIZE: usize = 32;
const HEADER_SIZE: usize = MAGIC.len() + 1 + 12 + SALT_SIZE + NONCE_SIZE;

// Upper bound on the memory cost accepted from a blob header (1 GiB)
const MAX_MEMORY_KIB: u32 = 1024 * 1024;

/// Argon2id cost parameters used when sealing a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl KdfParams {
    fn to_argon2(self) -> Result<Params> {
        if self.memory_kib > MAX_MEMORY_KIB {
            return Err(EmrError::Authentication(
                "identity table header requests an unreasonable key derivation cost".to_string(),
            ));
        }
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_SIZE),
        )
        .map_err(|e| EmrError::Authentication(format!("invalid key derivation parameters: {e}")))
    }
}

/// Saves and loads identity tables under a password
#[derive(Debug, Clone, Default)]
pub struct TableStore {
    params: KdfParams,
}

impl TableStore {
    /// Store using the default Argon2id cost
    pub fn new() -> Self {
        Self::default()
    }

    /// Store using explicit Argon2id cost parameters for newly sealed tables
    pub fn with_params(params: KdfParams) -> Self {
        Self { params }
    }

    /// Encrypt `table` and write it to `path`
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::Configuration`] if the password is empty or `path`
    /// exists and `overwrite` is false.
    pub fn save(
        &self,
        table: &IdentityTable,
        path: impl AsRef<Path>,
        password: &SecretString,
        overwrite: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            return Err(EmrError::Configuration(format!(
                "refusing to overwrite existing identity table {}",
                path.display()
            )));
        }

        let blob = self.seal(table, password)?;
        write_bytes(path, &blob)?;

        tracing::info!(
            path = %path.display(),
            entries = table.len(),
            fingerprint = %table.fingerprint(),
            "Saved encrypted identity table"
        );
        Ok(())
    }

    /// Read and decrypt the table stored at `path`
    ///
    /// # Errors
    ///
    /// Returns [`EmrError::NotFound`] if `path` does not exist and
    /// [`EmrError::Authentication`] if the password is wrong or the blob is
    /// damaged. No part of the table is returned on failure.
    pub fn load(&self, path: impl AsRef<Path>, password: &SecretString) -> Result<IdentityTable> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EmrError::NotFound(path.display().to_string()));
        }

        let blob = std::fs::read(path)
            .map_err(|e| EmrError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let table = self.open(&blob, password)?;

        tracing::info!(
            path = %path.display(),
            entries = table.len(),
            fingerprint = %table.fingerprint(),
            "Loaded encrypted identity table"
        );
        Ok(table)
    }

    /// Serialize and encrypt a table into a blob
    pub fn seal(&self, table: &IdentityTable, password: &SecretString) -> Result<Vec<u8>> {
        let password = password_bytes(password)?;

        let mut salt = [0u8; SALT_SIZE];
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let mut header = Vec::with_capacity(HEADER_SIZE);
        header.extend_from_slice(MAGIC);
        header.push(FORMAT_VERSION);
        header.extend_from_slice(&self.params.memory_kib.to_le_bytes());
        header.extend_from_slice(&self.params.iterations.to_le_bytes());
        header.extend_from_slice(&self.params.parallelism.to_le_bytes());
        header.extend_from_slice(&salt);
        header.extend_from_slice(&nonce);

        let key = derive_key(password, &salt, self.params)?;
        let plaintext = Zeroizing::new(serde_json::to_vec(table)?);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_slice()));
        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext.as_slice(),
                    aad: &header,
                },
            )
            .map_err(|_| EmrError::Serialization("failed to encrypt identity table".to_string()))?;

        let mut blob = header;
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Decrypt and deserialize a blob produced by [`seal`](Self::seal)
    pub fn open(&self, blob: &[u8], password: &SecretString) -> Result<IdentityTable> {
        let password = password_bytes(password)?;

        if blob.len() < HEADER_SIZE || &blob[..MAGIC.len()] != MAGIC {
            return Err(EmrError::Authentication(
                "not an encrypted identity table".to_string(),
            ));
        }
        let version = blob[MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(EmrError::Authentication(format!(
                "unsupported identity table format version {version}"
            )));
        }

        let (header, ciphertext) = blob.split_at(HEADER_SIZE);
        let mut offset = MAGIC.len() + 1;
        let mut next_u32 = || {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&header[offset..offset + 4]);
            offset += 4;
            u32::from_le_bytes(bytes)
        };
        let params = KdfParams {
            memory_kib: next_u32(),
            iterations: next_u32(),
            parallelism: next_u32(),
        };
        let salt_start = MAGIC.len() + 1 + 12;
        let salt = &header[salt_start..salt_start + SALT_SIZE];
        let nonce = &header[salt_start + SALT_SIZE..HEADER_SIZE];

        let key = derive_key(password, salt, params)?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_slice()));
        let plaintext = cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad: header,
                },
            )
            .map(Zeroizing::new)
            .map_err(|_| {
                EmrError::Authentication(
                    "wrong password or corrupted identity table".to_string(),
                )
            })?;

        let table: IdentityTable = serde_json::from_slice(&plaintext).map_err(|e| {
            EmrError::Authentication(format!("identity table contents are invalid: {e}"))
        })?;
        Ok(table)
    }
}

fn password_bytes(password: &SecretString) -> Result<&[u8]> {
    let value = password.expose_secret();
    if value.is_empty() {
        return Err(EmrError::Configuration(
            "identity table password must not be empty".to_string(),
        ));
    }
    Ok(value.as_ref().as_bytes())
}

fn derive_key(password: &[u8], salt: &[u8], params: KdfParams) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(password, salt, key.as_mut_slice())
        .map_err(|e| EmrError::Authentication(format!("key derivation failed: {e}")))?;
    Ok(key)
}
