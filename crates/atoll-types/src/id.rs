use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to parse an [`ObjectId`] from its hex form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdDecodeError {
    #[error("object id is not valid hex: {0}")]
    InvalidHex(String),

    #[error("object id must be 32 bytes, got {0}")]
    WrongLength(usize),
}

/// 256-bit unsigned object identifier, stored as 32 little-endian bytes.
///
/// Identifiers are issued monotonically by a root's counter and are never
/// reused, even after the object they named is deleted. The all-zero value
/// is reserved as the root sentinel; real objects start at 1.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    /// The reserved root sentinel (zero). Never assigned to an object.
    pub const ROOT: Self = Self([0u8; 32]);

    /// Returns `true` if this is the root sentinel.
    pub fn is_root(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The identifier one greater than this one, with carry propagation
    /// across all 32 bytes.
    pub fn successor(&self) -> Self {
        let mut bytes = self.0;
        for b in bytes.iter_mut() {
            let (v, carry) = b.overflowing_add(1);
            *b = v;
            if !carry {
                break;
            }
        }
        Self(bytes)
    }

    /// Build an identifier from a small counter value.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&value.to_le_bytes());
        Self(bytes)
    }

    /// The counter value, if it fits in 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[8..].iter().any(|&b| b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.0[..8]);
        Some(u64::from_le_bytes(low))
    }

    /// The raw 32 little-endian bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create from raw little-endian bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hex-encoded string, most significant byte first.
    pub fn to_hex(&self) -> String {
        let mut be = self.0;
        be.reverse();
        hex::encode(be)
    }

    /// Parse from a 64-character hex string (most significant byte first).
    pub fn from_hex(s: &str) -> Result<Self, IdDecodeError> {
        let bytes = hex::decode(s).map_err(|e| IdDecodeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(IdDecodeError::WrongLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        arr.reverse();
        Ok(Self(arr))
    }
}

impl Ord for ObjectId {
    fn cmp(&self, other: &Self) -> Ordering {
        // Numeric order: compare from the most significant byte down.
        for i in (0..32).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ObjectId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u64() {
            Some(n) => write!(f, "ObjectId({n})"),
            None => write!(f, "ObjectId({})", self.to_hex()),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u64() {
            Some(n) => write!(f, "{n}"),
            None => write!(f, "{}", self.to_hex()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_zero() {
        assert!(ObjectId::ROOT.is_root());
        assert_eq!(ObjectId::ROOT.as_bytes(), &[0u8; 32]);
        assert_eq!(ObjectId::ROOT.to_u64(), Some(0));
    }

    #[test]
    fn successor_advances_by_one() {
        let one = ObjectId::ROOT.successor();
        assert_eq!(one, ObjectId::from_u64(1));
        assert_eq!(one.successor(), ObjectId::from_u64(2));
        assert!(!one.is_root());
    }

    #[test]
    fn successor_carries_across_bytes() {
        let id = ObjectId::from_u64(255);
        assert_eq!(id.successor(), ObjectId::from_u64(256));

        let id = ObjectId::from_u64(u64::MAX);
        let next = id.successor();
        // 2^64 does not fit in the low 8 bytes anymore.
        assert_eq!(next.to_u64(), None);
        assert_eq!(next.as_bytes()[8], 1);
        assert!(next.as_bytes()[..8].iter().all(|&b| b == 0));
    }

    #[test]
    fn u64_roundtrip() {
        for v in [0u64, 1, 42, 1_000_000, u64::MAX] {
            assert_eq!(ObjectId::from_u64(v).to_u64(), Some(v));
        }
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(ObjectId::from_u64(1) < ObjectId::from_u64(2));
        assert!(ObjectId::from_u64(255) < ObjectId::from_u64(256));
        // A value with a high byte set dwarfs any u64.
        let mut big = [0u8; 32];
        big[31] = 1;
        assert!(ObjectId::from_u64(u64::MAX) < ObjectId::from_bytes(big));
    }

    #[test]
    fn hex_roundtrip() {
        let id = ObjectId::from_u64(0xDEAD_BEEF);
        let parsed = ObjectId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_hex_rejects_bad_length() {
        let err = ObjectId::from_hex("abcd").unwrap_err();
        assert_eq!(err, IdDecodeError::WrongLength(2));
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let err = ObjectId::from_hex("zz").unwrap_err();
        assert!(matches!(err, IdDecodeError::InvalidHex(_)));
    }

    #[test]
    fn display_small_values_as_decimal() {
        assert_eq!(format!("{}", ObjectId::from_u64(7)), "7");
        assert_eq!(format!("{:?}", ObjectId::from_u64(7)), "ObjectId(7)");
    }

    #[test]
    fn serde_roundtrip() {
        let id = ObjectId::from_u64(99);
        let bytes = bincode::serialize(&id).unwrap();
        let decoded: ObjectId = bincode::deserialize(&bytes).unwrap();
        assert_eq!(id, decoded);
    }
}
