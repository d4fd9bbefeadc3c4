//! Plain JSON stream codec.

use crate::error::{CodecError, CodecResult};
use crate::StreamCodec;
use serde_json::Value;
use std::io::{Read, Write};

/// The default codec: uncompressed JSON.
///
/// Produces human-readable files with the `.json` extension. Decoding
/// anything that is not valid JSON (including gzip output from
/// [`crate::GzipCodec`]) fails with [`CodecError::FormatMismatch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Creates a new JSON codec.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StreamCodec for JsonCodec {
    fn extension(&self) -> &str {
        ".json"
    }

    fn write_value(&self, writer: &mut dyn Write, value: &Value) -> CodecResult<()> {
        serde_json::to_writer(&mut *writer, value)
            .map_err(|e| CodecError::encode(e.to_string()))?;
        writer.flush()?;
        Ok(())
    }

    fn read_value(&self, reader: &mut dyn Read) -> CodecResult<Value> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        serde_json::from_slice(&buf).map_err(|e| CodecError::format_mismatch(e.to_string()))
    }
}
