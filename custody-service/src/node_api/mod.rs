//! The HTTP face of one shard node. Peer-facing only; it carries no API-key check.

mod handlers;
mod router;

pub use router::{build_node_router, run_node_server};
