use crate::foundation::{derive_keypair, seed_from_phrase, CustodyError, DerivationPath, NodeId, SigningKeypair};
use crate::foundation::{MNEMONIC_WORD_COUNT, SHARD_COUNT, SHARD_WORD_COUNT};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use zeroize::Zeroizing;

/// Splits a 24-word phrase into three space-joined groups of eight words, in order.
pub fn split_phrase(phrase: &str) -> Result<[Zeroizing<String>; SHARD_COUNT], CustodyError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() != MNEMONIC_WORD_COUNT {
        return Err(CustodyError::validation("mnemonic", format!("must contain {MNEMONIC_WORD_COUNT} words, got {}", words.len())));
    }
    let mut chunks = words.chunks(SHARD_WORD_COUNT).map(|chunk| Zeroizing::new(chunk.join(" ")));
    let mut next = || chunks.next().ok_or_else(|| CustodyError::Message("mnemonic chunking produced too few shards".to_string()));
    Ok([next()?, next()?, next()?])
}

/// Decrypted shards collected for one reconstruction, indexed by owning node.
#[derive(Default)]
pub struct ShardSet {
    slots: [Option<Zeroizing<String>>; SHARD_COUNT],
}

impl ShardSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shard. A second shard for the same node is a consistency failure.
    pub fn insert(&mut self, node: NodeId, plaintext: Zeroizing<String>) -> Result<(), CustodyError> {
        let slot = &mut self.slots[node.slot()];
        if slot.is_some() {
            return Err(CustodyError::consensus(format!("duplicate shard reported for node {node}")));
        }
        *slot = Some(plaintext);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.len() == SHARD_COUNT
    }

    pub fn missing(&self) -> Vec<NodeId> {
        NodeId::all().filter(|node| self.slots[node.slot()].is_none()).collect()
    }

    /// Shards in fixed node order (1, 2, 3); fails unless every slot is filled.
    pub fn ordered(&self) -> Result<Vec<&str>, CustodyError> {
        self.slots
            .iter()
            .zip(NodeId::all())
            .map(|(slot, node)| {
                slot.as_deref().map(String::as_str).ok_or_else(|| CustodyError::consensus(format!("missing shard for node {node}")))
            })
            .collect()
    }
}

impl fmt::Debug for ShardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardSet").field("present", &self.len()).field("missing", &self.missing()).finish()
    }
}

/// The reconstructed recovery phrase. Lives for a single derive/sign call and is wiped on drop.
pub struct MasterSeedMaterial {
    phrase: SecretString,
}

impl MasterSeedMaterial {
    pub fn new(phrase: String) -> Self {
        Self { phrase: SecretString::new(phrase) }
    }

    pub fn expose_phrase(&self) -> &str {
        self.phrase.expose_secret()
    }

    pub fn derive_keypair(&self, path: &DerivationPath) -> Result<SigningKeypair, CustodyError> {
        let seed = seed_from_phrase(self.phrase.expose_secret(), "")?;
        derive_keypair(&seed[..], path)
    }
}

impl fmt::Debug for MasterSeedMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSeedMaterial(<redacted>)")
    }
}
