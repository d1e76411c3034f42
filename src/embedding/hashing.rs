//! Local hashing vectorizer.
//!
//! Implements [`EmbeddingProvider`] with term-frequency feature hashing: tokens are
//! hashed with 32-bit FNV-1a into a fixed number of buckets, then the vector is
//! L2-normalized. No vocabulary, no IDF, no state.

use super::EmbeddingProvider;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Stateless feature-hashing embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingVectorizer {
    dimension: usize,
}

impl HashingVectorizer {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashingVectorizer {
    fn default() -> Self {
        Self::new(super::DEFAULT_DIMENSION)
    }
}

impl EmbeddingProvider for HashingVectorizer {
    fn embed(&self, text: &str) -> Vec<f32> {
        vectorize(text, self.dimension)
    }

    fn dimensions(&self) -> usize {
        self.dimension
    }
}

/// Turn `text` into a `dimension`-length vector.
///
/// Each token increments the bucket `fnv1a(token) % dimension`. The result is
/// unit-length, except for text without tokens, which yields all zeros.
pub fn vectorize(text: &str, dimension: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimension];
    if dimension == 0 {
        return vector;
    }

    for token in tokenize(text) {
        let bucket = fnv1a(token.as_bytes()) as usize % dimension;
        vector[bucket] += 1.0;
    }

    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

/// Split text into lowercase word tokens.
///
/// camelCase, acronym (`HTTPServer`) and letter/digit boundaries become word breaks,
/// `_` and `-` act as spaces, and any other punctuation is removed outright.
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut spaced = String::with_capacity(text.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && is_boundary(chars[i - 1], c, chars.get(i + 1).copied()) {
            spaced.push(' ');
        }
        spaced.push(c);
    }

    let mut cleaned = String::with_capacity(spaced.len());
    for c in spaced.chars().flat_map(char::to_lowercase) {
        if c == '_' || c == '-' || c.is_whitespace() {
            cleaned.push(' ');
        } else if c.is_alphanumeric() {
            cleaned.push(c);
        }
    }

    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Whether a word break belongs between `prev` and `cur`.
fn is_boundary(prev: char, cur: char, next: Option<char>) -> bool {
    let camel = prev.is_lowercase() && cur.is_uppercase();
    let acronym = prev.is_uppercase()
        && cur.is_uppercase()
        && next.is_some_and(|n| n.is_lowercase());
    let letter_digit = (prev.is_alphabetic() && cur.is_numeric())
        || (prev.is_numeric() && cur.is_alphabetic());
    camel || acronym || letter_digit
}

/// 32-bit FNV-1a.
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}
