//! Payload encodings: base64, gzip+base64 and JSON normalization.

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::Value;

use crate::error::CompileError;

pub fn base64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn base64_decode(payload: &str) -> Result<Vec<u8>, CompileError> {
    Ok(STANDARD.decode(payload)?)
}

pub fn gzip_base64_encode(bytes: &[u8]) -> Result<String, CompileError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).map_err(CompileError::Gzip)?;
    let compressed = encoder.finish().map_err(CompileError::Gzip)?;
    Ok(base64_encode(&compressed))
}

pub fn gzip_base64_decode(payload: &str) -> Result<Vec<u8>, CompileError> {
    let compressed = base64_decode(payload)?;
    let mut out = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut out)
        .map_err(CompileError::Gzip)?;
    Ok(out)
}

/// Parse `text` as a JSON document, if it is one.
pub fn parse_json(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Compact JSON with object keys sorted; `None` when `text` is not JSON.
pub fn json_normalize(text: &str) -> Option<String> {
    parse_json(text).and_then(|v| serde_json::to_string(&v).ok())
}

/// Indented JSON with object keys sorted; `None` when `text` is not JSON.
pub fn json_normalize_pretty(text: &str) -> Option<String> {
    parse_json(text).and_then(|v| serde_json::to_string_pretty(&v).ok())
}

/// Re-encode an inline base64 payload as gzip+base64.
///
/// JSON content is normalized before compression.
pub fn payload_to_gzip(payload: &str) -> Result<String, CompileError> {
    let raw = base64_decode(payload)?;
    match std::str::from_utf8(&raw).ok().and_then(json_normalize) {
        Some(json) => gzip_base64_encode(json.as_bytes()),
        None => gzip_base64_encode(&raw),
    }
}

/// Decode a payload for display: text when it is UTF-8, pretty-printed when
/// it is JSON. `None` for binary content.
pub fn decode_payload(payload: &str) -> Result<Option<String>, CompileError> {
    let raw = base64_decode(payload)?;
    let Ok(text) = String::from_utf8(raw) else {
        return Ok(None);
    };
    Ok(Some(json_normalize_pretty(&text).unwrap_or(text)))
}
