use serde::{Deserialize, Serialize};

/// A counter object used to implement auto-increment ID fields.
/// Values are handed out exactly once and never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    next: u64,
}

impl Counter {
    /// Create a new `Counter` starting at the given value.
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    /// Retrieve the next value of the counter, advancing it.
    pub fn next(&mut self) -> u64 {
        let value = self.next;
        self.next += 1;
        value
    }
}
