//! Domain layer: pure custody rules with no I/O.

pub mod custody;
pub mod model;
pub mod quorum;
pub mod shard;
pub mod transaction;
pub mod validation;

pub use custody::{ConcatenationScheme, ShardScheme};
pub use model::{TransactionRecord, TxStatus, UsedNonce, Wallet};
pub use quorum::QuorumPolicy;
pub use shard::{split_phrase, MasterSeedMaterial, ShardSet};
pub use transaction::{EthAmount, SignedMessage, SignedTransfer, TransferFields};
