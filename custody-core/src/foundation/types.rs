use crate::foundation::{CustodyError, SHARD_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One-based node identifier; also the shard's position in the joined phrase.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct NodeId(u8);

impl NodeId {
    pub fn new(value: u8) -> Result<Self, CustodyError> {
        if value == 0 || usize::from(value) > SHARD_COUNT {
            return Err(CustodyError::validation("node_id", format!("must be within 1..={SHARD_COUNT}, got {value}")));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Zero-based slot used when ordering shards.
    pub fn slot(&self) -> usize {
        usize::from(self.0) - 1
    }

    pub fn all() -> impl Iterator<Item = NodeId> {
        (1..=SHARD_COUNT as u8).map(NodeId)
    }
}

impl TryFrom<u8> for NodeId {
    type Error = CustodyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeId> for u8 {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
