//! Pluggable secret reconstruction.
//!
//! `ConcatenationScheme` treats each shard as a literal slice of the recovery phrase: it offers no
//! threshold security and any one shard leaks a third of the secret. Alternative schemes (for
//! example Shamir sharing) plug in behind `ShardScheme` without touching the coordinator.

use crate::domain::shard::{split_phrase, MasterSeedMaterial, ShardSet};
use crate::foundation::{CustodyError, SHARD_COUNT};
use zeroize::Zeroizing;

pub trait ShardScheme: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fewest shards from which `reconstruct` can succeed.
    fn min_shards(&self) -> usize;

    fn split(&self, phrase: &str) -> Result<Vec<Zeroizing<String>>, CustodyError>;

    fn reconstruct(&self, shards: &ShardSet) -> Result<MasterSeedMaterial, CustodyError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConcatenationScheme;

impl ShardScheme for ConcatenationScheme {
    fn name(&self) -> &'static str {
        "concatenation"
    }

    fn min_shards(&self) -> usize {
        SHARD_COUNT
    }

    fn split(&self, phrase: &str) -> Result<Vec<Zeroizing<String>>, CustodyError> {
        Ok(split_phrase(phrase)?.into_iter().collect())
    }

    fn reconstruct(&self, shards: &ShardSet) -> Result<MasterSeedMaterial, CustodyError> {
        if !shards.is_complete() {
            return Err(CustodyError::consensus(format!(
                "{} scheme needs all {} shards, missing nodes {:?}",
                self.name(),
                SHARD_COUNT,
                shards.missing().iter().map(|node| node.get()).collect::<Vec<_>>()
            )));
        }
        Ok(MasterSeedMaterial::new(shards.ordered()?.join(" ")))
    }
}
