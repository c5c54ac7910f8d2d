use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to parse an [`AuthorityId`] from its hex form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthorityDecodeError {
    #[error("authority id is not valid hex: {0}")]
    InvalidHex(String),

    #[error("authority id must be 32 bytes, got {0}")]
    WrongLength(usize),
}

/// Material used to derive an [`AuthorityId`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorityMaterial {
    /// An ed25519-style public key (32 bytes).
    PublicKey([u8; 32]),
    /// A raw 32-byte seed, for hosts that mint identities themselves.
    Seed([u8; 32]),
}

/// Identity of the single writer bound to a filesystem root.
///
/// An `AuthorityId` is derived deterministically from [`AuthorityMaterial`]
/// using BLAKE3. The same material always produces the same identity, and
/// the root's storage key is in turn derived from it, so a caller cannot
/// reach a root it does not own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorityId {
    hash: [u8; 32],
}

impl AuthorityId {
    /// Derive an `AuthorityId` from identity material.
    pub fn derive(material: &AuthorityMaterial) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"atoll-authority-v1:");
        match material {
            AuthorityMaterial::PublicKey(pk) => {
                hasher.update(b"pubkey:");
                hasher.update(pk);
            }
            AuthorityMaterial::Seed(seed) => {
                hasher.update(b"seed:");
                hasher.update(seed);
            }
        }
        Self {
            hash: *hasher.finalize().as_bytes(),
        }
    }

    /// Create an ephemeral (random) identity for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self::derive(&AuthorityMaterial::Seed(bytes))
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.hash
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("auth:{}", hex::encode(&self.hash[..4]))
    }

    /// Parse from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, AuthorityDecodeError> {
        let s = s.strip_prefix("auth:").unwrap_or(s);
        let bytes =
            hex::decode(s).map_err(|e| AuthorityDecodeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(AuthorityDecodeError::WrongLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { hash: arr })
    }

    /// Create from a raw 32-byte hash. Use `derive()` for production code.
    pub fn from_raw(hash: [u8; 32]) -> Self {
        Self { hash }
    }
}

impl fmt::Debug for AuthorityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorityId({})", self.short_id())
    }
}

impl fmt::Display for AuthorityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
