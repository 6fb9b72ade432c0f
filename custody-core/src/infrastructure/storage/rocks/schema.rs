/// Helper to build storage keys consistently.
pub struct KeyBuilder {
    buf: Vec<u8>,
}

impl KeyBuilder {
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    pub fn prefix(mut self, prefix: &[u8]) -> Self {
        self.buf.extend_from_slice(prefix);
        self
    }

    pub fn str(mut self, value: &str) -> Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    pub fn u64_be(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

pub const CF_METADATA: &str = "metadata";
pub const CF_DEFAULT: &str = "default";
/// Lowercased address -> `StoredWallet`.
pub const CF_WALLET: &str = "wallet";
/// Nonce string -> `UsedNonce`.
pub const CF_NONCE: &str = "nonce";
/// Big-endian sequence number -> `TransactionRecord`; iteration order is append order.
pub const CF_TX_LOG: &str = "tx_log";

pub const META_SCHEMA_VERSION: &[u8] = b"schema_version";
pub const META_WALLET_SEQ: &[u8] = b"wallet_seq";
pub const META_TX_SEQ: &[u8] = b"tx_seq";

pub const SCHEMA_VERSION: u32 = 1;

pub fn key_wallet(address_lower: &str) -> Vec<u8> {
    KeyBuilder::with_capacity(4 + address_lower.len()).prefix(b"wlt:").str(address_lower).build()
}

pub fn key_nonce(nonce: &str) -> Vec<u8> {
    KeyBuilder::with_capacity(4 + nonce.len()).prefix(b"non:").str(nonce).build()
}

pub fn key_tx(seq: u64) -> Vec<u8> {
    KeyBuilder::with_capacity(8).u64_be(seq).build()
}
