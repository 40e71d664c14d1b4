use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::pipeline::{parse_digest, DigestParseError};

use super::{ElectionId, ReceiptId};

/// The SHA-256 of `"{enrollment}:{election}"`: the key under which a
/// voter's receipts are indexed, so "did I vote" lookups work without the
/// plaintext enrollment ID being stored alongside any receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityHash([u8; 32]);

impl IdentityHash {
    pub fn new(enrollment_id: &str, election_id: ElectionId) -> Self {
        Self(Sha256::digest(format!("{enrollment_id}:{election_id}")).into())
    }

    /// The short human-displayable prefix shown on a receipt. `tag_bytes`
    /// is policy (see
    /// [`Config::receipt_tag_bytes`](crate::Config::receipt_tag_bytes)),
    /// clamped to the digest length.
    pub fn tag(&self, tag_bytes: usize) -> String {
        let len = tag_bytes.min(self.0.len());
        format!("0x{}", HEXLOWER.encode(&self.0[..len]))
    }
}

impl Display for IdentityHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", HEXLOWER.encode(&self.0))
    }
}

impl TryFrom<String> for IdentityHash {
    type Error = DigestParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        parse_digest(&s).map(Self)
    }
}

impl From<IdentityHash> for String {
    fn from(hash: IdentityHash) -> Self {
        hash.to_string()
    }
}

/// Proof that a vote was cast, decoupled from its content: nothing in a
/// receipt identifies the chosen candidate. Immutable once minted; IDs
/// are globally monotonic across all elections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    pub election_id: ElectionId,
    pub visible_tag: String,
    pub cast_at: DateTime<Utc>,
}
