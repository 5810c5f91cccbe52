//! Text encoders
//!
//! The search core only knows the [`Encoder`] contract: text in, fixed-length
//! vector out, deterministic for a given model identity. [`HtpEncoder`] is the
//! built-in backend.
//!
//! # Harmonic Token Projection (HTP)
//!
//! A deterministic, training-free embedding:
//! "Harmonic Token Projection: A Vocabulary-Free, Training-Free,
//!  Deterministic, and Reversible Embedding Methodology"
//! https://arxiv.org/html/2511.20665
//!
//! - No model file, no network
//! - Same input → same output, across instances and processes
//! - Unicode-based tokens, so any script works

use std::f64::consts::PI;

use super::error::EncoderError;

/// Default embedding dimension (2 * number of coprime moduli)
pub const DEFAULT_DIMENSION: usize = 384;

/// Largest supported dimension, bounded by the prime table below
pub const MAX_DIMENSION: usize = 2 * COPRIME_MODULI.len();

/// Maximum token length (Unicode code points)
const MAX_TOKEN_LENGTH: usize = 64;

/// First 194 primes, pairwise coprime by construction
const COPRIME_MODULI: &[u64] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71,
    73, 79, 83, 89, 97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151,
    157, 163, 167, 173, 179, 181, 191, 193, 197, 199, 211, 223, 227, 229, 233,
    239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307, 311, 313, 317,
    331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419,
    421, 431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503,
    509, 521, 523, 541, 547, 557, 563, 569, 571, 577, 587, 593, 599, 601, 607,
    613, 617, 619, 631, 641, 643, 647, 653, 659, 661, 673, 677, 683, 691, 701,
    709, 719, 727, 733, 739, 743, 751, 757, 761, 769, 773, 787, 797, 809, 811,
    821, 823, 827, 829, 839, 853, 857, 859, 863, 877, 881, 883, 887, 907, 911,
    919, 929, 937, 941, 947, 953, 967, 971, 977, 983, 991, 997, 1009, 1013,
    1019, 1021, 1031, 1033, 1039, 1049, 1051, 1061, 1063, 1069, 1087, 1091,
    1093, 1097, 1103, 1109, 1117, 1123, 1129, 1151, 1153, 1163, 1171, 1181,
];

/// Text → vector capability consumed by the search engine.
///
/// Implementations must be deterministic for a fixed [`model_id`](Self::model_id)
/// and always return vectors of length [`dimension`](Self::dimension).
pub trait Encoder {
    /// Identity of the underlying model; equal ids imply equal outputs
    fn model_id(&self) -> &str;

    /// Output dimension `d`
    fn dimension(&self) -> usize;

    fn encode_one(&self, text: &str) -> Result<Vec<f32>, EncoderError>;

    /// Encode several texts, positionally aligned with the input.
    ///
    /// Stops at the first failing text.
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EncoderError> {
        texts.iter().map(|t| self.encode_one(t)).collect()
    }
}

impl<E: Encoder + ?Sized> Encoder for &E {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn encode_one(&self, text: &str) -> Result<Vec<f32>, EncoderError> {
        (**self).encode_one(text)
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EncoderError> {
        (**self).encode_batch(texts)
    }
}

/// HTP embedding model
#[derive(Debug, Clone)]
pub struct HtpEncoder {
    moduli: Vec<u64>,
    model_id: String,
}

impl HtpEncoder {
    /// HTP model with [`DEFAULT_DIMENSION`]
    pub fn new() -> Self {
        Self::build(DEFAULT_DIMENSION)
    }

    /// HTP model with a custom dimension (even, `2..=MAX_DIMENSION`)
    pub fn with_dimension(dimension: usize) -> Result<Self, EncoderError> {
        if dimension < 2 || dimension % 2 != 0 || dimension > MAX_DIMENSION {
            return Err(EncoderError::InvalidConfig(format!(
                "HTP dimension must be even and within 2..={}, got {}",
                MAX_DIMENSION, dimension
            )));
        }
        Ok(Self::build(dimension))
    }

    fn build(dimension: usize) -> Self {
        Self {
            moduli: COPRIME_MODULI[..dimension / 2].to_vec(),
            model_id: format!("htp-{}", dimension),
        }
    }

    /// Embed a single token
    ///
    /// For each modulus m_i: r_i = N mod m_i, E_i = [sin(2πr_i/m_i), cos(2πr_i/m_i)]
    fn embed_token(&self, token: &str) -> Vec<f64> {
        let n = token_to_integer(token);

        let mut embedding = Vec::with_capacity(self.moduli.len() * 2);
        for &m in &self.moduli {
            let r = n % m;
            let theta = 2.0 * PI * (r as f64) / (m as f64);
            embedding.push(theta.sin());
            embedding.push(theta.cos());
        }

        embedding
    }
}

impl Default for HtpEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for HtpEncoder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.moduli.len() * 2
    }

    /// Tokenize, embed each token, mean pool, L2 normalize
    fn encode_one(&self, text: &str) -> Result<Vec<f32>, EncoderError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(EncoderError::EmptyInput);
        }

        let mut sum = vec![0.0f64; self.dimension()];
        for token in &tokens {
            for (acc, val) in sum.iter_mut().zip(self.embed_token(token)) {
                *acc += val;
            }
        }

        let count = tokens.len() as f64;
        for val in &mut sum {
            *val /= count;
        }

        let norm: f64 = sum.iter().map(|x| x * x).sum::<f64>().sqrt();
        let embedding = if norm > 0.0 {
            sum.iter().map(|x| (*x / norm) as f32).collect()
        } else {
            sum.iter().map(|x| *x as f32).collect()
        };

        Ok(embedding)
    }
}

/// N = Σ u_j * B^(L-j) with B = 2^16, wrapping on overflow
fn token_to_integer(token: &str) -> u64 {
    token
        .chars()
        .take(MAX_TOKEN_LENGTH)
        .fold(0u64, |n, c| n.wrapping_mul(65536).wrapping_add(c as u64))
}

/// Lowercased words split on whitespace and ASCII punctuation
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect()
}
