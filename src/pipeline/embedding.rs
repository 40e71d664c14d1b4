use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of components in a face embedding, fixed regardless of the
/// resolution of the frame it was derived from.
pub const EMBEDDING_DIM: usize = 128;

/// A fixed-length feature vector representing one biometric sample.
/// Produced by the encoder from a live capture; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding([f32; EMBEDDING_DIM]);

impl Embedding {
    pub(crate) fn from_components(components: [f32; EMBEDDING_DIM]) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[f32; EMBEDDING_DIM] {
        &self.0
    }

    /// Euclidean distance to another embedding in feature space.
    /// Symmetric; zero iff the embeddings are component-wise equal.
    pub fn distance(&self, other: &Embedding) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = (a - b) as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt() as f32
    }

    /// Whether `candidate` is close enough to count as the same face.
    /// The threshold is always the caller's policy
    /// (see [`Config::match_threshold`](crate::Config::match_threshold)).
    pub fn matches(&self, candidate: &Embedding, threshold: f32) -> bool {
        self.distance(candidate) <= threshold
    }

    /// The canonical byte form: each component as little-endian IEEE 754,
    /// concatenated. This is what gets hashed into a commitment and what
    /// the authentication layer stores.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|c| c.to_le_bytes()).collect()
    }

    /// Reconstruct an embedding from its canonical byte form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WrongDimension> {
        if bytes.len() != EMBEDDING_DIM * 4 {
            return Err(WrongDimension(bytes.len() / 4));
        }
        let mut components = [0.0; EMBEDDING_DIM];
        for (component, word) in components.iter_mut().zip(bytes.chunks_exact(4)) {
            *component = f32::from_le_bytes([word[0], word[1], word[2], word[3]]);
        }
        Ok(Self(components))
    }
}

/// Error when constructing an [`Embedding`] from the wrong number of
/// components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Expected {EMBEDDING_DIM} components, got {0}")]
pub struct WrongDimension(pub usize);

impl TryFrom<Vec<f32>> for Embedding {
    type Error = WrongDimension;

    fn try_from(components: Vec<f32>) -> Result<Self, Self::Error> {
        let len = components.len();
        let components: [f32; EMBEDDING_DIM] =
            components.try_into().map_err(|_| WrongDimension(len))?;
        Ok(Self(components))
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(embedding: Embedding) -> Self {
        embedding.0.to_vec()
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Embedding {
        /// A constant embedding, analogous to a fixed test encoding.
        pub fn example() -> Self {
            Self([0.5; EMBEDDING_DIM])
        }

        /// A random unit-norm embedding, distinct from any other with
        /// overwhelming probability.
        pub fn random(rng: &mut impl rand::Rng) -> Self {
            let mut components = [0.0f32; EMBEDDING_DIM];
            for c in &mut components {
                *c = rng.gen_range(-1.0..1.0);
            }
            let norm = components.iter().map(|c| c * c).sum::<f32>().sqrt();
            for c in &mut components {
                *c /= norm + 1e-8;
            }
            Self(components)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let mut rng = rand::thread_rng();
        let a = Embedding::random(&mut rng);
        let b = Embedding::random(&mut rng);
        assert_eq!(a.distance(&b), b.distance(&a));
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn matches_is_a_threshold_on_distance() {
        let a = Embedding::example();
        let mut shifted = *a.components();
        shifted[0] += 0.1;
        let b = Embedding::from_components(shifted);
        let d = a.distance(&b);
        assert!(a.matches(&b, d));
        assert!(!a.matches(&b, d * 0.99));
        // Exact self-match at any non-negative threshold.
        assert!(a.matches(&a, 0.0));
    }

    #[test]
    fn byte_form_round_trips() {
        let embedding = Embedding::random(&mut rand::thread_rng());
        let bytes = embedding.to_bytes();
        assert_eq!(bytes.len(), EMBEDDING_DIM * 4);
        assert_eq!(Embedding::from_bytes(&bytes).unwrap(), embedding);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(Embedding::from_bytes(&[0; 12]), Err(WrongDimension(3)));
        assert_eq!(
            Embedding::try_from(vec![0.0; 64]),
            Err(WrongDimension(64))
        );
    }

    #[test]
    fn serde_round_trip() {
        let embedding = Embedding::random(&mut rand::thread_rng());
        let json = serde_json::to_string(&embedding).unwrap();
        let back: Embedding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, embedding);
    }
}
