use std::fmt::{self, Display, Formatter};

use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::embedding::Embedding;

/// A 32-byte one-way digest of an [`Embedding`]: the only form of
/// biometric identity that ever reaches the ledger. Deterministic, so the
/// same embedding always lands on the same commitment, and not invertible
/// back to feature values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Commitment([u8; 32]);

impl Commitment {
    /// Commit to an embedding by hashing its canonical byte form.
    pub fn of(embedding: &Embedding) -> Self {
        Self(Sha256::digest(embedding.to_bytes()).into())
    }

    /// Wrap a digest obtained elsewhere, e.g. read back from the
    /// substrate's journal.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for Commitment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", HEXLOWER.encode(&self.0))
    }
}

/// Error when parsing a 32-byte digest from its `0x`-prefixed hex form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestParseError {
    #[error("Expected 64 hex characters, got {0}")]
    Length(usize),
    #[error("Invalid hex: {0}")]
    Hex(#[from] data_encoding::DecodeError),
}

/// Parse a `0x`-prefixed (or bare) lowercase hex digest.
pub(crate) fn parse_digest(s: &str) -> Result<[u8; 32], DigestParseError> {
    let hex = s.strip_prefix("0x").unwrap_or(s);
    if hex.len() != 64 {
        return Err(DigestParseError::Length(hex.len()));
    }
    let bytes = HEXLOWER.decode(hex.as_bytes())?;
    let mut digest = [0; 32];
    digest.copy_from_slice(&bytes);
    Ok(digest)
}

impl TryFrom<String> for Commitment {
    type Error = DigestParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        parse_digest(&s).map(Self)
    }
}

impl From<Commitment> for String {
    fn from(commitment: Commitment) -> Self {
        commitment.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_is_deterministic() {
        let embedding = Embedding::example();
        assert_eq!(Commitment::of(&embedding), Commitment::of(&embedding));
    }

    #[test]
    fn distinct_embeddings_commit_differently() {
        let mut rng = rand::thread_rng();
        let a = Embedding::random(&mut rng);
        let b = Embedding::random(&mut rng);
        assert_ne!(Commitment::of(&a), Commitment::of(&b));
    }

    #[test]
    fn display_parse_round_trip() {
        let commitment = Commitment::of(&Embedding::example());
        let hex = commitment.to_string();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 66);
        assert_eq!(Commitment::try_from(hex).unwrap(), commitment);
    }

    #[test]
    fn bad_digests_are_rejected() {
        assert_eq!(
            Commitment::try_from("0xabcd".to_string()),
            Err(DigestParseError::Length(4))
        );
        let not_hex = "zz".repeat(32);
        assert!(matches!(
            Commitment::try_from(not_hex),
            Err(DigestParseError::Hex(_))
        ));
    }

    #[test]
    fn serde_round_trip() {
        let commitment = Commitment::of(&Embedding::example());
        let json = serde_json::to_string(&commitment).unwrap();
        let back: Commitment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, commitment);
    }
}
