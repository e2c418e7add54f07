use crate::error::{Error, Result};

/// Decodes raw Kafka key or value bytes into a typed representation.
///
/// Read and observe requests default to [`Utf8Decoder`] for both key and
/// value; a non-default codec is selected when the request is built.
pub trait Decoder<T>: Send + Sync {
    fn decode(&self, raw: &[u8]) -> Result<T>;
}

/// Decodes bytes as UTF-8 strings. The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Decoder;

impl Decoder<String> for Utf8Decoder {
    fn decode(&self, raw: &[u8]) -> Result<String> {
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|e| Error::Decode(format!("payload is not valid UTF-8: {e}")))
    }
}

/// Passes bytes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesDecoder;

impl Decoder<Vec<u8>> for BytesDecoder {
    fn decode(&self, raw: &[u8]) -> Result<Vec<u8>> {
        Ok(raw.to_vec())
    }
}
