//! The identity commitment pipeline: captured frame → embedding →
//! commitment.
//!
//! Only the commitment ever reaches the ledger. Embeddings stay with the
//! off-ledger authentication layer, which compares a live sample against a
//! stored one with [`Embedding::matches`] before it touches the ledger at
//! all; the ledger itself only ever asks "has this exact commitment been
//! seen before", never "is this the same face".

pub(crate) use commitment::parse_digest;
pub use commitment::{Commitment, DigestParseError};
pub use embedding::{Embedding, WrongDimension, EMBEDDING_DIM};
pub use encoder::{FaceBox, FaceDetector, FaceEncoder, Frame, WholeFrameDetector};

mod commitment;
mod embedding;
mod encoder;
