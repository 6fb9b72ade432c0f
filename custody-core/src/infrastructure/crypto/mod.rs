pub mod shard_cipher;

pub use shard_cipher::ShardCipher;
