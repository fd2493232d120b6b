//! Persistent blob format: gzip-compressed GeoJSON text.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::error::CacheError;
use crate::geometry::FeatureCollection;

/// Serializes and compresses a feature collection.
pub fn encode_blob(collection: &FeatureCollection) -> Result<Vec<u8>, CacheError> {
    let json = serde_json::to_vec(collection)?;
    let mut encoder = GzEncoder::new(Vec::with_capacity(json.len() / 4), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Decompresses and parses a blob written by [`encode_blob`].
pub fn decode_blob(blob: &[u8]) -> Result<FeatureCollection, CacheError> {
    let mut json = Vec::new();
    GzDecoder::new(blob).read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}
