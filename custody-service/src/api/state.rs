use custody_core::application::{AuthGuard, WalletOperations};
use std::sync::Arc;

pub struct ApiState {
    pub auth: Arc<AuthGuard>,
    pub operations: Arc<WalletOperations>,
    pub version: &'static str,
}

impl ApiState {
    pub fn new(auth: Arc<AuthGuard>, operations: Arc<WalletOperations>) -> Self {
        Self { auth, operations, version: env!("CARGO_PKG_VERSION") }
    }
}
