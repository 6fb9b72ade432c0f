//! Shard encryption at rest and in transit.
//!
//! Wire format: `base64(IV ‖ ciphertext)` with a random 16 byte IV, AES-256 in CFB mode
//! and `key = SHA-256(passphrase)`. No authentication tag; integrity is checked indirectly by
//! comparing the derived address against the stored one.

use crate::foundation::{CustodyError, SHARD_IV_LEN};
use aes::cipher::{AsyncStreamCipher, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

type Aes256CfbEnc = cfb_mode::Encryptor<aes::Aes256>;
type Aes256CfbDec = cfb_mode::Decryptor<aes::Aes256>;

#[derive(Clone)]
pub struct ShardCipher {
    key: Zeroizing<[u8; 32]>,
}

impl ShardCipher {
    pub fn from_passphrase(passphrase: &str) -> Result<Self, CustodyError> {
        if passphrase.is_empty() {
            return Err(CustodyError::ConfigError("shard encryption passphrase not set".to_string()));
        }
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&Sha256::digest(passphrase.as_bytes()));
        Ok(Self { key })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CustodyError> {
        let mut iv = [0u8; SHARD_IV_LEN];
        OsRng.fill_bytes(&mut iv);
        self.encrypt_with_iv(plaintext, &iv)
    }

    fn encrypt_with_iv(&self, plaintext: &str, iv: &[u8; SHARD_IV_LEN]) -> Result<String, CustodyError> {
        let mut buf = plaintext.as_bytes().to_vec();
        Aes256CfbEnc::new_from_slices(&self.key[..], iv)
            .map_err(|err| CustodyError::crypto("aes-cfb init", err.to_string()))?
            .encrypt(&mut buf);
        let mut framed = Vec::with_capacity(SHARD_IV_LEN + buf.len());
        framed.extend_from_slice(iv);
        framed.extend_from_slice(&buf);
        Ok(STANDARD.encode(framed))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<Zeroizing<String>, CustodyError> {
        let framed = STANDARD.decode(encoded.trim())?;
        if framed.len() < SHARD_IV_LEN {
            return Err(CustodyError::crypto("shard decrypt", format!("payload shorter than IV: {} bytes", framed.len())));
        }
        let (iv, ciphertext) = framed.split_at(SHARD_IV_LEN);
        let mut buf = Zeroizing::new(ciphertext.to_vec());
        Aes256CfbDec::new_from_slices(&self.key[..], iv)
            .map_err(|err| CustodyError::crypto("aes-cfb init", err.to_string()))?
            .decrypt(&mut buf[..]);
        let text = std::str::from_utf8(&buf[..])
            .map_err(|_| CustodyError::crypto("shard decrypt", "plaintext is not UTF-8 (wrong passphrase?)"))?;
        Ok(Zeroizing::new(text.to_string()))
    }
}

impl fmt::Debug for ShardCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShardCipher(<redacted>)")
    }
}
