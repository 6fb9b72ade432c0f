pub mod chain;
#[cfg(any(test, feature = "test-utils"))]
pub mod fakes;
pub mod http;
pub mod node;

pub use chain::{ChainRpc, JsonRpcChainClient};
pub use node::{
    GenerateRequest, GenerateResponse, HttpNodeClient, NodeClient, NodeHealth, NodeSignRequest, NodeSignResponse, ShardResponse,
};
