//! System-wide constants for shard custody.

/// Number of shards the recovery phrase is split into. Fixed; never configurable.
pub const SHARD_COUNT: usize = 3;

/// Words per shard when a 24-word phrase is split.
pub const SHARD_WORD_COUNT: usize = 8;

/// Word count of a recovery phrase accepted by the splitter.
pub const MNEMONIC_WORD_COUNT: usize = SHARD_COUNT * SHARD_WORD_COUNT;

/// AES block-sized IV prefixed to every encrypted shard.
pub const SHARD_IV_LEN: usize = 16;

/// PBKDF2 iterations used to stretch a recovery phrase into a seed.
pub const SEED_PBKDF2_ROUNDS: u32 = 2048;

/// PBKDF2 salt prefix for seed stretching (followed by the optional passphrase).
pub const SEED_SALT_PREFIX: &str = "mnemonic";

/// Default accepted clock skew for signed requests (5 minutes).
pub const DEFAULT_REQUEST_EXPIRY_SECS: u64 = 300;

/// Nonce ledger rows older than this are purged by opportunistic cleanup (10 minutes).
pub const NONCE_RETENTION_SECS: u64 = 600;

/// Cleanup runs when `now % NONCE_CLEANUP_SAMPLE_MODULUS == 0`.
pub const NONCE_CLEANUP_SAMPLE_MODULUS: u64 = 60;

/// Per-node call timeout used when nothing is configured.
pub const DEFAULT_NODE_TIMEOUT_MS: u64 = 10_000;

/// Matching node responses required for wallet generation.
pub const DEFAULT_GENERATE_QUORUM: usize = 2;

/// Shards required before a coordinator-side signature is produced.
pub const DEFAULT_SIGN_REQUIRED_SHARDS: usize = SHARD_COUNT;

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Decimal places of one ether expressed in wei.
pub const ETH_DECIMALS: usize = 18;

/// Maximum total digits accepted in a decimal amount.
pub const MAX_AMOUNT_DIGITS: usize = 20;

/// Wei per ether (10^18).
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// Length of a `0x`-prefixed hex account address.
pub const ADDRESS_STRING_LEN: usize = 42;

/// Derivation path prefix for account keys; the final component is the wallet index.
pub const ACCOUNT_PATH_PREFIX: &str = "m/44'/60'/0'/0/";

/// Path of the master (funding) account.
pub const MASTER_HD_PATH: &str = "m/44'/60'/0'/0/0";

/// Characters of a signature shown in bulk-send summaries.
pub const SIGNATURE_PREVIEW_CHARS: usize = 20;

/// Maximum time to wait for a storage mutex before failing.
pub const STORAGE_LOCK_TIMEOUT_SECS: u64 = 5;

/// Maximum accepted HTTP request body size (1 MiB).
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;
