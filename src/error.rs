use thiserror::Error;

use crate::ledger::{CandidateId, ElectionId, ElectionPhase, ReceiptId};

pub type Result<T> = std::result::Result<T, Error>;

/// Every way a ledger or pipeline call can be rejected. All of these are
/// deterministic functions of current state: the caller may report them or
/// correct its request, but retrying without a state change is pointless.
/// A rejected call never leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("No election with ID {0}")]
    ElectionNotFound(ElectionId),
    #[error("No candidate with ID {1} in election {0}")]
    CandidateNotFound(ElectionId, CandidateId),
    #[error("No receipt with ID {0}")]
    ReceiptNotFound(ReceiptId),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Operation requires phase {expected}, but the election is {actual}")]
    InvalidPhase {
        expected: &'static str,
        actual: ElectionPhase,
    },
    #[error("Cannot start an election with {0} candidate(s); at least 2 are required")]
    TooFewCandidates(usize),
    #[error("Enrollment ID '{0}' is already registered for this election")]
    DuplicateEnrollment(String),
    #[error("This face is already registered for this election")]
    DuplicateFace,
    #[error("Enrollment ID '{0}' has already voted in this election")]
    AlreadyVoted(String),
    #[error("This face has already been used to vote in this election")]
    FaceAlreadyUsed,
    #[error("Candidate ID {0} is out of range for this election")]
    InvalidCandidate(CandidateId),
    #[error("Expected exactly one face in frame, found {0}")]
    NoFaceDetected(usize),
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}
