use thiserror::Error;

/// Errors produced while decoding wire data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("unexpected end of input: needed {needed} more bytes")]
    UnexpectedEof { needed: usize },

    #[error("ULEB128 value exceeds 64 bits")]
    VarintOverflow,

    #[error("invalid boolean byte: {0:#04x}")]
    InvalidBool(u8),

    #[error("invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("unknown event tag: {0:#04x}")]
    UnknownEventTag(u8),

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}
