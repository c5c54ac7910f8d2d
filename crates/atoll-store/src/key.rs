use std::fmt;

use atoll_types::AuthorityId;

/// Storage key of a filesystem root, derived from its bound authority.
///
/// The derivation is deterministic and domain-separated, so the same
/// authority always addresses the same root and nothing else.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootKey([u8; 32]);

impl RootKey {
    /// Derive the storage key for the given authority.
    pub fn derive(authority: &AuthorityId) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"atoll-root-v1:");
        hasher.update(authority.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// The raw 32-byte key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full hex-encoded string (also the file-store file stem).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootKey({})", &self.to_hex()[..8])
    }
}

impl fmt::Display for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let authority = AuthorityId::from_raw([5u8; 32]);
        assert_eq!(RootKey::derive(&authority), RootKey::derive(&authority));
    }

    #[test]
    fn different_authorities_different_keys() {
        let a = RootKey::derive(&AuthorityId::from_raw([1u8; 32]));
        let b = RootKey::derive(&AuthorityId::from_raw([2u8; 32]));
        assert_ne!(a, b);
    }

    #[test]
    fn key_is_not_the_raw_authority() {
        let authority = AuthorityId::from_raw([7u8; 32]);
        assert_ne!(RootKey::derive(&authority).as_bytes(), authority.as_bytes());
    }
}
