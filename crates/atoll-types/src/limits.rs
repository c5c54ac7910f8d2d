//! Byte-exact limits shared by every Atoll operation.
//!
//! String limits count UTF-8 bytes, not codepoints.

/// Maximum number of tags on a file or directory.
pub const MAX_TAGS: usize = 5;

/// Maximum length in bytes of any short string input: a path segment, a
/// tag, or a blob identifier.
pub const MAX_STRING_LEN: usize = 64;

/// Maximum length in bytes of a full path. Must accommodate at least six
/// maximum-length segments plus separators.
pub const MAX_PATH_LEN: usize = 512;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_limit_covers_six_full_segments() {
        assert!(MAX_PATH_LEN >= 6 * MAX_STRING_LEN);
    }
}
