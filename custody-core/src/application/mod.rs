//! Application layer: orchestration across domain logic and infrastructure I/O.

pub mod auth;
pub mod coordinator;
pub mod fanout;
pub mod node_service;
pub mod operations;
pub mod shard_store;

pub use auth::{request_signature, AuthGuard, AuthRequest, AuthSettings};
pub use coordinator::{Coordinator, CoordinatorSettings, GeneratedWallet, NodeStatus, TransactionSignature, TransferOrder};
pub use node_service::NodeService;
pub use operations::{BulkSendReport, BulkSendRequest, BulkTransfer, SignOutcome, SignRequest, WalletOperations};
pub use shard_store::ShardStore;
