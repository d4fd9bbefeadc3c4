//! # Depot Codec
//!
//! Stream codecs for Depot collections.
//!
//! A codec converts an object (or a whole collection) to and from bytes,
//! optionally wrapping the raw file stream. The storage layer treats the
//! result as opaque bytes; codec and file extension are configured together.
//!
//! ## Available codecs
//!
//! - [`JsonCodec`] - plain JSON, extension `.json`
//! - [`GzipCodec`] - gzip-wrapped JSON, extension `.json.gz`
//!
//! ## Usage
//!
//! ```
//! use depot_codec::{decode, encode, JsonCodec};
//!
//! let codec = JsonCodec::new();
//! let bytes = encode(&codec, &vec!["a", "b"]).unwrap();
//! let back: Vec<String> = decode(&codec, &bytes).unwrap();
//! assert_eq!(back, vec!["a", "b"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod gzip;
mod json;

pub use error::{CodecError, CodecResult};
pub use gzip::GzipCodec;
pub use json::JsonCodec;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::io::{Read, Write};

/// A pluggable byte-stream codec.
///
/// Implementations are object-safe and operate on untyped JSON values so a
/// repository can hold them behind `Arc<dyn StreamCodec>`. Typed access goes
/// through the free functions [`encode`] and [`decode`].
pub trait StreamCodec: Send + Sync {
    /// The file suffix this codec expects, including the leading dot.
    fn extension(&self) -> &str;

    /// Writes `value` to `writer` in this codec's wire format.
    fn write_value(&self, writer: &mut dyn Write, value: &Value) -> CodecResult<()>;

    /// Reads one value from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::FormatMismatch`] when the stream was not
    /// produced by this codec or is corrupt.
    fn read_value(&self, reader: &mut dyn Read) -> CodecResult<Value>;
}

/// Encodes a typed value to bytes using `codec`.
pub fn encode<T: Serialize>(codec: &dyn StreamCodec, value: &T) -> CodecResult<Vec<u8>> {
    let json = serde_json::to_value(value).map_err(|e| CodecError::encode(e.to_string()))?;
    let mut buf = Vec::new();
    codec.write_value(&mut buf, &json)?;
    Ok(buf)
}

/// Decodes a typed value from bytes using `codec`.
pub fn decode<T: DeserializeOwned>(codec: &dyn StreamCodec, bytes: &[u8]) -> CodecResult<T> {
    let json = codec.read_value(&mut &bytes[..])?;
    serde_json::from_value(json).map_err(|e| CodecError::format_mismatch(e.to_string()))
}
