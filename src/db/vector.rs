// Embedding codec and the distance the store ranks by.
//
// Vectors live in SQLite as little-endian f32 blobs. Distance is cosine
// distance (1 - cosine similarity), computed in f64.

use crate::error::{FastCmdError, Result};

const F32_BYTES: usize = std::mem::size_of::<f32>();

pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * F32_BYTES);
    for &value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode a stored blob, checking it holds exactly `dimension` floats
pub fn decode_embedding(blob: &[u8], dimension: usize) -> Result<Vec<f32>> {
    if blob.len() % F32_BYTES != 0 || blob.len() / F32_BYTES != dimension {
        return Err(FastCmdError::DimensionMismatch {
            expected: dimension,
            actual: blob.len() / F32_BYTES,
        });
    }

    Ok(blob
        .chunks_exact(F32_BYTES)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Cosine distance between two vectors of equal length
///
/// 0.0 means same direction, 2.0 opposite. A zero-norm vector has no
/// direction, so it sits at 1.0 from everything.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    // One sqrt over the product keeps self-distance at exactly 0.0
    let denom = (norm_a * norm_b).sqrt();
    if denom <= f64::EPSILON {
        return 1.0;
    }

    // Rounding can push similarity a hair past +/-1
    let similarity = (dot / denom).clamp(-1.0, 1.0);
    1.0 - similarity
}
