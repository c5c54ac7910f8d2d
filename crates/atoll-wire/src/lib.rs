//! Wire codec for Atoll read-only results and event payloads.
//!
//! The format is deliberately simple and position-based:
//!
//! - scalar integers are little-endian
//! - strings are a ULEB128 byte count followed by UTF-8 bytes
//! - sequences are a ULEB128 count followed by that many elements
//! - booleans are a single byte `0`/`1`
//! - object ids are 32 little-endian bytes
//!
//! [`WireWriter`] and [`WireReader`] handle the primitives; [`WireCodec`]
//! encodes and decodes the domain shapes (`ListEntry`, entry sequences,
//! `RecursiveSnapshot`, `FsEvent`).

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::WireCodec;
pub use error::WireError;
pub use reader::WireReader;
pub use writer::WireWriter;
