//! Persistent mistakes tracker for a vocabulary drill: a scoped store of
//! wrongly answered words, the derived virtual deck over it, and the session
//! gate that decides when a failure becomes a durable record.

pub mod core;
pub mod env;
pub mod gate;
pub mod persistence;
#[cfg(test)]
pub(crate) mod testutil;

pub use crate::core::tracker::MistakesTracker;
pub use crate::core::types::{Bucket, MistakesDoc, MistakesStats, WordRecord};
pub use crate::gate::SessionGate;
