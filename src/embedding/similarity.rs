//! Vector similarity functions.

/// Cosine similarity between two vectors.
///
/// Returns a value in `[-1.0, 1.0]`. Vectors of unequal length are incompatible and
/// score 0, as do empty or zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Dot product, the cosine shortcut for vectors already L2-normalized.
///
/// Returns 0 on length mismatch.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Arithmetic mean of equal-length vectors. Not renormalized.
pub(crate) fn mean_vector<'a>(vectors: impl IntoIterator<Item = &'a [f32]>) -> Vec<f32> {
    let mut sum: Vec<f32> = Vec::new();
    let mut count = 0usize;
    for v in vectors {
        if sum.is_empty() {
            sum = vec![0.0; v.len()];
        }
        if v.len() != sum.len() {
            continue;
        }
        for (acc, x) in sum.iter_mut().zip(v) {
            *acc += x;
        }
        count += 1;
    }
    if count > 1 {
        let n = count as f32;
        for x in &mut sum {
            *x /= n;
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::vectorize;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_symmetric() {
        let a = vec![0.8, 0.6, 0.1];
        let b = vec![0.3, 0.9, 0.4];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(dot(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_dot_agrees_with_cosine_for_unit_vectors() {
        let a = vectorize("relationship scoring across nodes", 256);
        let b = vectorize("scoring relationship strength", 256);
        assert!((dot(&a, &b) - cosine_similarity(&a, &b)).abs() < 1e-6);
    }

    #[test]
    fn test_mean_vector() {
        let a = [1.0f32, 0.0];
        let b = [0.0f32, 1.0];
        let mean = mean_vector([&a[..], &b[..]]);
        assert_eq!(mean, vec![0.5, 0.5]);
        assert!(mean_vector(std::iter::empty::<&[f32]>()).is_empty());
    }
}
