pub mod config;
pub mod crypto;
pub mod logging;
pub mod rpc;
pub mod storage;
