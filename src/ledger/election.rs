use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::rolls::Rolls;
use super::{CandidateId, ElectionId};

/// Phases in the election lifecycle. Strictly linear: no phase is ever
/// skipped or revisited.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionPhase {
    /// Under construction: candidates may be added, voters registered.
    Created,
    /// Voting is open; registration stays open too.
    Active,
    /// Voting is closed.
    Ended,
    /// Results are official.
    ResultDeclared,
}

impl ElectionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Active => "Active",
            Self::Ended => "Ended",
            Self::ResultDeclared => "ResultDeclared",
        }
    }
}

impl Display for ElectionPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate standing in one election. IDs are sequential from 1 within
/// their election; `vote_count` only ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub vote_count: u64,
}

/// Core election data plus its private registration rolls. Elections are
/// never deleted, so an ID either denotes exactly one of these forever or
/// was never assigned.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Election {
    pub id: ElectionId,
    pub name: String,
    pub description: String,
    pub phase: ElectionPhase,
    candidates: Vec<Candidate>,
    pub total_votes: u64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub(crate) rolls: Rolls,
}

impl Election {
    /// Create a new election in the `Created` phase with no candidates.
    pub(crate) fn new(id: ElectionId, name: String, description: String) -> Self {
        Self {
            id,
            name,
            description,
            phase: ElectionPhase::Created,
            candidates: Vec::new(),
            total_votes: 0,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
            rolls: Rolls::default(),
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Look up a candidate by its 1-based ID.
    pub fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        // IDs are assigned sequentially, so this is a direct index.
        id.checked_sub(1)
            .and_then(|index| self.candidates.get(index as usize))
    }

    /// Append a candidate, returning its ID. Only allowed while the
    /// election is under construction.
    pub(crate) fn add_candidate(&mut self, name: String) -> Result<CandidateId> {
        self.expect_phase(ElectionPhase::Created)?;
        let id = self.candidates.len() as CandidateId + 1;
        self.candidates.push(Candidate {
            id,
            name,
            vote_count: 0,
        });
        Ok(id)
    }

    /// `Created → Active`. Requires at least two candidates; a failed
    /// start leaves the election in `Created`.
    pub(crate) fn start(&mut self) -> Result<()> {
        self.expect_phase(ElectionPhase::Created)?;
        if self.candidates.len() < 2 {
            return Err(Error::TooFewCandidates(self.candidates.len()));
        }
        self.phase = ElectionPhase::Active;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// `Active → Ended`.
    pub(crate) fn end(&mut self) -> Result<()> {
        self.expect_phase(ElectionPhase::Active)?;
        self.phase = ElectionPhase::Ended;
        self.ended_at = Some(Utc::now());
        Ok(())
    }

    /// `Ended → ResultDeclared`.
    pub(crate) fn declare_results(&mut self) -> Result<()> {
        self.expect_phase(ElectionPhase::Ended)?;
        self.phase = ElectionPhase::ResultDeclared;
        Ok(())
    }

    /// Count one vote for the given candidate, keeping the tally
    /// invariant: `total_votes` equals the sum of candidate counts.
    pub(crate) fn tally_vote(&mut self, candidate_id: CandidateId) -> Result<()> {
        let candidate = candidate_id
            .checked_sub(1)
            .and_then(|index| self.candidates.get_mut(index as usize))
            .ok_or(Error::InvalidCandidate(candidate_id))?;
        candidate.vote_count += 1;
        self.total_votes += 1;
        Ok(())
    }

    pub(crate) fn expect_phase(&self, expected: ElectionPhase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(Error::InvalidPhase {
                expected: expected.as_str(),
                actual: self.phase,
            })
        }
    }

    /// Registration is permitted while under construction or in progress.
    pub(crate) fn expect_registration_open(&self) -> Result<()> {
        match self.phase {
            ElectionPhase::Created | ElectionPhase::Active => Ok(()),
            actual => Err(Error::InvalidPhase {
                expected: "Created or Active",
                actual,
            }),
        }
    }
}
