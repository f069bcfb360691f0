/// Cosine similarity between two embedding vectors
///
/// # Returns
/// A value in [-1, 1]. Vectors that cannot be compared (empty, different
/// lengths, zero norm or non-finite components) yield 0.0.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let cos = dot / (norm_a * norm_b).sqrt();
    if cos.is_finite() {
        cos.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Map a cosine similarity from [-1, 1] onto [0, 1]
#[inline]
pub fn normalize_similarity(cos: f64) -> f64 {
    ((cos + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Normalized semantic score for an optional pair of embeddings
///
/// Missing embeddings on either side score 0.0, not 0.5.
pub fn semantic_score(user: Option<&[f32]>, item: Option<&[f32]>) -> f64 {
    match (user, item) {
        (Some(u), Some(i)) if !u.is_empty() && !i.is_empty() && u.len() == i.len() => {
            normalize_similarity(cosine_similarity(u, i))
        }
        _ => 0.0,
    }
}
