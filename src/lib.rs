//! The election integrity ledger at the core of our biometric-gated voting
//! system.
//!
//! The [`ledger`] module holds the phase-gated election state machine:
//! voter registration, one-vote-per-identity enforcement via two independent
//! keys (enrollment ID and face commitment), and privacy-preserving receipt
//! minting. The [`pipeline`] module turns a captured frame into a fixed-size
//! embedding and derives the one-way commitment that is the only biometric
//! identity the ledger ever sees.
//!
//! The HTTP layer, session handling, camera capture, and the durable
//! append-only substrate the ledger runs on are all external to this crate.
//! The substrate is assumed to serialise mutations; `&mut self` on the
//! [`Ledger`](ledger::Ledger) methods encodes exactly that single-writer
//! discipline.

pub mod config;
pub mod error;
pub mod ledger;
pub mod pipeline;

pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
