use crate::foundation::{CustodyError, SEED_PBKDF2_ROUNDS, SEED_SALT_PREFIX};
use bip32::XPrv;
use ethers_core::types::H160;
use ethers_core::utils::{keccak256, to_checksum};
use hmac::Hmac;
use secp256k1::{ecdsa::RecoverableSignature, Message, PublicKey, Secp256k1, SecretKey};
use sha2::Sha512;
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, Zeroizing};

type HmacSha512 = Hmac<Sha512>;

/// BIP-32 derivation path such as `m/44'/60'/0'/0/0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivationPath(bip32::DerivationPath);

impl DerivationPath {
    /// Child numbers with the hardened bit set where marked.
    pub fn indices(&self) -> Vec<u32> {
        self.0.iter().map(u32::from).collect()
    }
}

impl FromStr for DerivationPath {
    type Err = CustodyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        trimmed
            .parse::<bip32::DerivationPath>()
            .map(Self)
            .map_err(|err| CustodyError::InvalidDerivationPath(format!("{trimmed}: {err}")))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Stretches a recovery phrase into a 64-byte seed (PBKDF2-HMAC-SHA512, 2048 rounds).
///
/// Words are normalized to single spaces. The phrase checksum is not verified, so any
/// word sequence derives a seed.
pub fn seed_from_phrase(phrase: &str, passphrase: &str) -> Result<Zeroizing<[u8; 64]>, CustodyError> {
    let normalized = Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "));
    let salt = Zeroizing::new(format!("{SEED_SALT_PREFIX}{passphrase}"));
    let mut seed = Zeroizing::new([0u8; 64]);
    pbkdf2::pbkdf2::<HmacSha512>(normalized.as_bytes(), salt.as_bytes(), SEED_PBKDF2_ROUNDS, &mut seed[..])
        .map_err(|err| CustodyError::crypto("pbkdf2 seed", err.to_string()))?;
    Ok(seed)
}

/// Derives the secp256k1 keypair at `path` from a BIP-32 seed.
pub fn derive_keypair(seed: &[u8], path: &DerivationPath) -> Result<SigningKeypair, CustodyError> {
    let xprv = XPrv::derive_from_path(seed, &path.0).map_err(|err| CustodyError::crypto("bip32 derive", err.to_string()))?;
    let secret_bytes = Zeroizing::new(xprv.to_bytes());
    let secret = SecretKey::from_slice(&secret_bytes[..])?;
    let public_key = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret);
    Ok(SigningKeypair { public_key, secret_bytes: secret.secret_bytes() })
}

/// Account address: the last 20 bytes of keccak-256 over the uncompressed public key.
pub fn address_from_public_key(public_key: &PublicKey) -> H160 {
    let uncompressed = public_key.serialize_uncompressed();
    let digest = keccak256(&uncompressed[1..]);
    H160::from_slice(&digest[12..])
}

/// EIP-55 mixed-case rendering of an address.
pub fn checksum_address(address: &H160) -> String {
    to_checksum(address, None)
}

/// Recoverable ECDSA signature split into its wire components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EcdsaSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub recovery_id: u8,
}

impl EcdsaSignature {
    fn from_recoverable(sig: &RecoverableSignature) -> Self {
        let (recovery_id, compact) = sig.serialize_compact();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        Self { r, s, recovery_id: recovery_id.to_i32() as u8 }
    }

    /// `0x` + hex(r ‖ s ‖ v) with `v = 27 + recovery_id`.
    pub fn to_rsv_hex(&self) -> String {
        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&self.r);
        bytes.extend_from_slice(&self.s);
        bytes.push(27 + self.recovery_id);
        format!("0x{}", hex::encode(bytes))
    }
}

pub struct SigningKeypair {
    public_key: PublicKey,
    secret_bytes: [u8; 32],
}

impl SigningKeypair {
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn address(&self) -> H160 {
        address_from_public_key(&self.public_key)
    }

    /// Deterministic (RFC 6979) recoverable signature over a 32-byte digest.
    pub fn sign_digest(&self, digest: [u8; 32]) -> Result<EcdsaSignature, CustodyError> {
        let secp = Secp256k1::signing_only();
        let secret = SecretKey::from_slice(&self.secret_bytes)?;
        let sig = secp.sign_ecdsa_recoverable(&Message::from_digest(digest), &secret);
        Ok(EcdsaSignature::from_recoverable(&sig))
    }
}

impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeypair").field("public_key", &self.public_key).field("secret_bytes", &"<redacted>").finish()
    }
}

impl Drop for SigningKeypair {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Zeroize for SigningKeypair {
    fn zeroize(&mut self) {
        self.secret_bytes.zeroize();
    }
}
