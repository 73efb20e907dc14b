use thiserror::Error;

/// Two vectors from different embedding models were compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("embedding dimension mismatch: {left} vs {right}")]
pub struct DimensionMismatch {
    pub left: usize,
    pub right: usize,
}

/// Cosine similarity remapped from [-1, 1] to [0, 1].
///
/// A zero-norm vector on either side scores 0. Mismatched lengths are an
/// integration defect and are reported, never scored.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, DimensionMismatch> {
    if a.len() != b.len() {
        return Err(DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let cosine = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0);
    Ok(((cosine + 1.0) / 2.0).clamp(0.0, 1.0))
}
