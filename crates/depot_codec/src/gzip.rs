//! Gzip-wrapped JSON stream codec.

use crate::error::{CodecError, CodecResult};
use crate::StreamCodec;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;
use std::io::{Read, Write};

/// Leading bytes of every gzip member (RFC 1952).
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A codec that wraps the JSON payload in a gzip stream.
///
/// The storage layer never knows compression is in effect; the codec and the
/// configured file extension are chosen together. Decoding a stream that does
/// not start with the gzip magic fails with [`CodecError::FormatMismatch`],
/// so files written by the plain [`crate::JsonCodec`] are rejected instead of
/// being misread.
#[derive(Debug, Clone, Copy)]
pub struct GzipCodec {
    level: Compression,
}

impl GzipCodec {
    /// Creates a gzip codec with the default compression level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }

    /// Creates a gzip codec with an explicit compression level.
    #[must_use]
    pub fn with_level(level: Compression) -> Self {
        Self { level }
    }
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamCodec for GzipCodec {
    fn extension(&self) -> &str {
        ".json.gz"
    }

    fn write_value(&self, writer: &mut dyn Write, value: &Value) -> CodecResult<()> {
        let json = serde_json::to_vec(value).map_err(|e| CodecError::encode(e.to_string()))?;
        let mut encoder = GzEncoder::new(&mut *writer, self.level);
        encoder.write_all(&json)?;
        encoder.finish()?;
        writer.flush()?;
        Ok(())
    }

    fn read_value(&self, reader: &mut dyn Read) -> CodecResult<Value> {
        let mut compressed = Vec::new();
        reader.read_to_end(&mut compressed)?;

        if compressed.len() < GZIP_MAGIC.len() || compressed[..2] != GZIP_MAGIC {
            return Err(CodecError::format_mismatch(
                "payload does not start with a gzip header",
            ));
        }

        let mut decoder = GzDecoder::new(compressed.as_slice());
        let mut json = Vec::new();
        decoder
            .read_to_end(&mut json)
            .map_err(|e| CodecError::format_mismatch(format!("gzip stream: {e}")))?;

        serde_json::from_slice(&json).map_err(|e| CodecError::format_mismatch(e.to_string()))
    }
}
