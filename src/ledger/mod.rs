//! The ledger aggregate: the whole of the on-ledger election state, with
//! the mutating operations and the read-only query surface over it.

pub use counter::Counter;
pub use election::{Candidate, Election, ElectionPhase};
pub use receipt::{IdentityHash, Receipt};
pub use rolls::Rolls;

mod counter;
mod election;
mod receipt;
mod rolls;

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pipeline::Commitment;

/// Election IDs are assigned from a global monotonic counter, starting at 1.
pub type ElectionId = u64;
/// Candidate IDs are sequential within their election, starting at 1.
pub type CandidateId = u64;
/// Receipt IDs are globally monotonic across all elections, starting at 1.
pub type ReceiptId = u64;

/// The entire on-ledger state, owned as a single aggregate with an
/// explicit lifecycle: the substrate constructs one, journals it, and
/// replays mutations against it. All mutations take `&mut self`, matching
/// the substrate's single-writer-at-a-time execution model; queries take
/// `&self` and only ever observe fully-committed state.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ledger {
    /// The administrator identity checked by the registry operations.
    admin: String,
    /// Receipt tag width in bytes, fixed at construction from [`Config`].
    receipt_tag_bytes: usize,
    elections: BTreeMap<ElectionId, Election>,
    election_ids: Counter,
    receipts: BTreeMap<ReceiptId, Receipt>,
    receipt_ids: Counter,
    /// Reverse index from identity hash to the receipts minted under it.
    receipts_by_identity: HashMap<IdentityHash, Vec<ReceiptId>>,
}

impl Ledger {
    /// Create an empty ledger administered by the given identity.
    pub fn new(admin: impl Into<String>, config: &Config) -> Self {
        Self {
            admin: admin.into(),
            receipt_tag_bytes: config.receipt_tag_bytes(),
            elections: BTreeMap::new(),
            election_ids: Counter::new(1),
            receipts: BTreeMap::new(),
            receipt_ids: Counter::new(1),
            receipts_by_identity: HashMap::new(),
        }
    }

    /// Create a new election in the `Created` phase. Admin only.
    pub fn create_election(
        &mut self,
        caller: &str,
        name: String,
        description: String,
    ) -> Result<ElectionId> {
        self.authorize(caller)?;
        let id = self.election_ids.next();
        info!("Creating election {id}: '{name}'");
        self.elections.insert(id, Election::new(id, name, description));
        Ok(id)
    }

    /// Append a candidate to an election under construction. Admin only.
    pub fn add_candidate(
        &mut self,
        caller: &str,
        election_id: ElectionId,
        name: String,
    ) -> Result<CandidateId> {
        self.authorize(caller)?;
        self.election_mut(election_id)?.add_candidate(name)
    }

    /// Open an election for voting. Admin only; requires at least two
    /// candidates.
    pub fn start_election(&mut self, caller: &str, election_id: ElectionId) -> Result<()> {
        self.authorize(caller)?;
        self.election_mut(election_id)?.start()?;
        info!("Election {election_id} is now active");
        Ok(())
    }

    /// Close an active election. Admin only.
    pub fn end_election(&mut self, caller: &str, election_id: ElectionId) -> Result<()> {
        self.authorize(caller)?;
        self.election_mut(election_id)?.end()?;
        info!("Election {election_id} has ended");
        Ok(())
    }

    /// Declare the results of an ended election official. Admin only.
    pub fn declare_results(&mut self, caller: &str, election_id: ElectionId) -> Result<()> {
        self.authorize(caller)?;
        self.election_mut(election_id)?.declare_results()?;
        info!("Results declared for election {election_id}");
        Ok(())
    }

    /// Register a voter for an election under both uniqueness keys.
    /// Permitted while the election is `Created` or `Active`. Rejected
    /// registrations leave no trace.
    pub fn register_voter(
        &mut self,
        election_id: ElectionId,
        enrollment_id: &str,
        commitment: Commitment,
    ) -> Result<()> {
        let election = self.election_mut(election_id)?;
        election.expect_registration_open()?;
        election.rolls.register(enrollment_id, commitment)?;
        info!("Registered a voter for election {election_id}");
        Ok(())
    }

    /// Record one vote and mint its receipt as a single logical
    /// transaction.
    ///
    /// The caller has already verified the live face against the stored
    /// one off-ledger; the ledger trusts the commitment it is handed and
    /// checks set membership only. Every precondition is checked before
    /// the first write, so a rejected vote mutates nothing, and a
    /// successful one commits the tally, the voted marks, and the receipt
    /// together.
    pub fn vote(
        &mut self,
        election_id: ElectionId,
        enrollment_id: &str,
        commitment: Commitment,
        candidate_id: CandidateId,
    ) -> Result<ReceiptId> {
        let tag_bytes = self.receipt_tag_bytes;
        let election = self
            .elections
            .get_mut(&election_id)
            .ok_or(Error::ElectionNotFound(election_id))?;
        election.expect_phase(ElectionPhase::Active)?;
        if election.rolls.has_voted(enrollment_id) {
            warn!("Rejected repeat vote in election {election_id}");
            return Err(Error::AlreadyVoted(enrollment_id.to_string()));
        }
        if election.rolls.face_used(&commitment) {
            warn!("Rejected reused face in election {election_id}");
            return Err(Error::FaceAlreadyUsed);
        }
        // Final precondition: the candidate must exist.
        if election.candidate(candidate_id).is_none() {
            return Err(Error::InvalidCandidate(candidate_id));
        }
        // Walk-up registration: an identity voting without a prior
        // register_voter call joins the rolls here, under the same
        // uniqueness checks. In particular a commitment registered to
        // someone else is rejected before anything is mutated.
        if !election.rolls.is_registered(enrollment_id) {
            election.rolls.register(enrollment_id, commitment)?;
        }

        election.tally_vote(candidate_id)?;
        election.rolls.mark_voted(enrollment_id, commitment);

        let receipt_id = self.receipt_ids.next();
        let identity = IdentityHash::new(enrollment_id, election_id);
        self.receipts.insert(
            receipt_id,
            Receipt {
                id: receipt_id,
                election_id,
                visible_tag: identity.tag(tag_bytes),
                cast_at: Utc::now(),
            },
        );
        self.receipts_by_identity
            .entry(identity)
            .or_default()
            .push(receipt_id);
        info!("Vote recorded in election {election_id}; minted receipt {receipt_id}");
        Ok(receipt_id)
    }

    // === Query surface: side-effect-free reads over committed state. ===

    pub fn election(&self, election_id: ElectionId) -> Result<&Election> {
        self.elections
            .get(&election_id)
            .ok_or(Error::ElectionNotFound(election_id))
    }

    /// All elections ever created, in ID order.
    pub fn elections(&self) -> impl Iterator<Item = &Election> {
        self.elections.values()
    }

    pub fn election_count(&self) -> u64 {
        self.elections.len() as u64
    }

    pub fn phase(&self, election_id: ElectionId) -> Result<ElectionPhase> {
        Ok(self.election(election_id)?.phase)
    }

    pub fn candidate(
        &self,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<&Candidate> {
        self.election(election_id)?
            .candidate(candidate_id)
            .ok_or(Error::CandidateNotFound(election_id, candidate_id))
    }

    pub fn candidates(&self, election_id: ElectionId) -> Result<&[Candidate]> {
        Ok(self.election(election_id)?.candidates())
    }

    pub fn receipt(&self, receipt_id: ReceiptId) -> Result<&Receipt> {
        self.receipts
            .get(&receipt_id)
            .ok_or(Error::ReceiptNotFound(receipt_id))
    }

    pub fn receipt_exists(&self, receipt_id: ReceiptId) -> bool {
        self.receipts.contains_key(&receipt_id)
    }

    /// The "did I vote" lookup: receipt IDs minted under the identity
    /// hash of this enrollment ID and election.
    pub fn find_receipts(
        &self,
        enrollment_id: &str,
        election_id: ElectionId,
    ) -> Result<&[ReceiptId]> {
        self.election(election_id)?;
        Ok(self
            .receipts_by_identity
            .get(&IdentityHash::new(enrollment_id, election_id))
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }

    pub fn has_registered(&self, election_id: ElectionId, enrollment_id: &str) -> Result<bool> {
        Ok(self.election(election_id)?.rolls.is_registered(enrollment_id))
    }

    pub fn has_voted(&self, election_id: ElectionId, enrollment_id: &str) -> Result<bool> {
        Ok(self.election(election_id)?.rolls.has_voted(enrollment_id))
    }

    fn authorize(&self, caller: &str) -> Result<()> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(Error::Unauthorized(format!(
                "'{caller}' is not the administrator"
            )))
        }
    }

    fn election_mut(&mut self, election_id: ElectionId) -> Result<&mut Election> {
        self.elections
            .get_mut(&election_id)
            .ok_or(Error::ElectionNotFound(election_id))
    }
}
