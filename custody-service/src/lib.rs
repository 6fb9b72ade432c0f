//! HTTP surfaces for the custody system: the coordinator API and the shard node API.

pub mod api;
pub mod node_api;
