//! Embedding vector codec and distance math
//!
//! Vectors are persisted as little-endian f32 blobs. Distances are plain
//! Euclidean (L2); over unit-length vectors `d^2 = 2 - 2*cos`, so callers
//! can recover cosine similarity from a distance without touching the
//! raw vectors again.

use crate::error::{Error, Result};

/// Encode an embedding as a little-endian f32 blob
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode a little-endian f32 blob, checking the expected dimension
pub fn decode_embedding(blob: &[u8], dimension: usize) -> Result<Vec<f32>> {
    if blob.len() != dimension * 4 {
        return Err(Error::Storage(format!(
            "Embedding blob has {} bytes, expected {} for dimension {}",
            blob.len(),
            dimension * 4,
            dimension
        )));
    }

    let mut vector = Vec::with_capacity(dimension);
    for chunk in blob.chunks_exact(4) {
        vector.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    Ok(vector)
}

/// Euclidean (L2) distance between two vectors of equal length
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Cosine similarity recovered from an L2 distance between unit vectors
pub fn similarity_from_distance(distance: f32) -> f32 {
    1.0 - distance * distance / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let vector = vec![0.25f32, -1.5, 3.75, 0.0];
        let blob = encode_embedding(&vector);
        assert_eq!(blob.len(), 16);

        let decoded = decode_embedding(&blob, 4).unwrap();
        assert_eq!(decoded, vector);
    }

    #[test]
    fn test_decode_rejects_wrong_dimension() {
        let blob = encode_embedding(&[1.0, 2.0]);
        let err = decode_embedding(&blob, 3).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_similarity_identity_for_unit_vectors() {
        // 1 - d^2/2 must equal the dot product for unit vectors
        let identical = ([1.0f32, 0.0], [1.0f32, 0.0]);
        let orthogonal = ([1.0f32, 0.0], [0.0f32, 1.0]);
        let opposite = ([1.0f32, 0.0], [-1.0f32, 0.0]);

        for ((a, b), expected) in [(identical, 1.0f32), (orthogonal, 0.0), (opposite, -1.0)] {
            let d = l2_distance(&a, &b);
            let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
            assert!((similarity_from_distance(d) - expected).abs() < 1e-6);
            assert!((similarity_from_distance(d) - dot).abs() < 1e-6);
        }
    }

    #[test]
    fn test_l2_distance_basic() {
        assert_eq!(l2_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(l2_distance(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }
}
