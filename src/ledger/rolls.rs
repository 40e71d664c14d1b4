use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::Commitment;

/// One election's duplicate-prevention sets: who is registered and who
/// has voted, keyed independently by enrollment ID and by face
/// commitment. Entries are permanent; there is no deregistration and a
/// voted mark is never cleared.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rolls {
    registered_enrollments: HashSet<String>,
    registered_faces: HashSet<Commitment>,
    voted_enrollments: HashSet<String>,
    used_faces: HashSet<Commitment>,
}

impl Rolls {
    /// Register an identity under both keys. Both uniqueness checks must
    /// pass before either set grows: a rejected registration has no side
    /// effect at all.
    pub fn register(&mut self, enrollment_id: &str, commitment: Commitment) -> Result<()> {
        if self.registered_faces.contains(&commitment) {
            return Err(Error::DuplicateFace);
        }
        if self.registered_enrollments.contains(enrollment_id) {
            return Err(Error::DuplicateEnrollment(enrollment_id.to_string()));
        }
        self.registered_enrollments.insert(enrollment_id.to_string());
        self.registered_faces.insert(commitment);
        Ok(())
    }

    /// Mark an identity as having voted, under both keys.
    pub fn mark_voted(&mut self, enrollment_id: &str, commitment: Commitment) {
        self.voted_enrollments.insert(enrollment_id.to_string());
        self.used_faces.insert(commitment);
    }

    pub fn is_registered(&self, enrollment_id: &str) -> bool {
        self.registered_enrollments.contains(enrollment_id)
    }

    pub fn has_voted(&self, enrollment_id: &str) -> bool {
        self.voted_enrollments.contains(enrollment_id)
    }

    pub fn face_used(&self, commitment: &Commitment) -> bool {
        self.used_faces.contains(commitment)
    }
}

#[cfg(test)]
mod tests {
    use crate::pipeline::Embedding;

    use super::*;

    fn commitments() -> (Commitment, Commitment) {
        let mut rng = rand::thread_rng();
        (
            Commitment::of(&Embedding::random(&mut rng)),
            Commitment::of(&Embedding::random(&mut rng)),
        )
    }

    #[test]
    fn same_face_cannot_register_twice() {
        let (c1, _) = commitments();
        let mut rolls = Rolls::default();
        rolls.register("S1", c1).unwrap();
        // A different enrollment ID does not help.
        assert_eq!(rolls.register("S2", c1), Err(Error::DuplicateFace));
    }

    #[test]
    fn same_enrollment_cannot_register_twice() {
        let (c1, c2) = commitments();
        let mut rolls = Rolls::default();
        rolls.register("S1", c1).unwrap();
        // A different face does not help.
        assert_eq!(
            rolls.register("S1", c2),
            Err(Error::DuplicateEnrollment("S1".to_string()))
        );
    }

    #[test]
    fn rejected_registration_has_no_side_effect() {
        let (c1, c2) = commitments();
        let mut rolls = Rolls::default();
        rolls.register("S1", c1).unwrap();

        // Fails the face check; "S2" must not be half-registered.
        assert_eq!(rolls.register("S2", c1), Err(Error::DuplicateFace));
        assert!(!rolls.is_registered("S2"));
        rolls.register("S2", c2).unwrap();
    }

    #[test]
    fn voting_marks_both_keys() {
        let (c1, _) = commitments();
        let mut rolls = Rolls::default();
        rolls.register("S1", c1).unwrap();
        assert!(!rolls.has_voted("S1"));
        assert!(!rolls.face_used(&c1));

        rolls.mark_voted("S1", c1);
        assert!(rolls.has_voted("S1"));
        assert!(rolls.face_used(&c1));
    }

}
