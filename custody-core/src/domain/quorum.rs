use crate::foundation::{CustodyError, SHARD_COUNT};
use std::fmt::Debug;

/// How many of the `SHARD_COUNT` nodes must answer before a result is accepted.
///
/// Wallet generation and signing each carry their own policy so they can be tuned apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuorumPolicy {
    required: usize,
}

impl QuorumPolicy {
    pub fn new(required: usize) -> Result<Self, CustodyError> {
        if required == 0 || required > SHARD_COUNT {
            return Err(CustodyError::ConfigError(format!("quorum must be within 1..={SHARD_COUNT}, got {required}")));
        }
        Ok(Self { required })
    }

    /// Every node must respond.
    pub fn strict() -> Self {
        Self { required: SHARD_COUNT }
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn is_strict(&self) -> bool {
        self.required == SHARD_COUNT
    }

    pub fn ensure_met(&self, received: usize) -> Result<(), CustodyError> {
        if received < self.required {
            return Err(CustodyError::consensus(format!(
                "received {received} of {SHARD_COUNT} node responses, need {}",
                self.required
            )));
        }
        Ok(())
    }

    /// Accepts the common value once enough responses agree.
    ///
    /// Every successful response must match the first one; a single dissenter fails the call
    /// even when the remaining responses would still meet the quorum.
    pub fn agree<T: PartialEq + Clone + Debug>(&self, values: &[T]) -> Result<T, CustodyError> {
        self.ensure_met(values.len())?;
        let first = &values[0];
        if let Some(other) = values.iter().find(|value| *value != first) {
            return Err(CustodyError::consensus(format!("nodes returned inconsistent values: {first:?} vs {other:?}")));
        }
        Ok(first.clone())
    }
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        Self::strict()
    }
}
