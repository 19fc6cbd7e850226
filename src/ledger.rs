//! Append-only block ledger.
//!
//! No consensus and no proof-of-work: blocks are hash-linked and can be
//! verified, nothing more. The detectors only read `timestamp` and
//! `transactions` from here.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Previous-hash placeholder stored in the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: f64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
        }
    }
}

/// A sealed block. The hash is computed once in the constructor and the
/// fields are only reachable through accessors afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    index: u64,
    timestamp: f64,
    transactions: Vec<Transaction>,
    previous_hash: String,
    nonce: u64,
    hash: String,
}

// Canonical hashing form: fields declared in sorted key order so the JSON
// encoding is independent of serde_json's map ordering features.
#[derive(Serialize)]
struct HashPayload<'a> {
    index: u64,
    nonce: u64,
    previous_hash: &'a str,
    timestamp: f64,
    transactions: Vec<TxPayload<'a>>,
}

#[derive(Serialize)]
struct TxPayload<'a> {
    amount: f64,
    receiver: &'a str,
    sender: &'a str,
}

impl Block {
    pub fn new(
        index: u64,
        timestamp: f64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
    ) -> Self {
        Self::with_nonce(index, timestamp, transactions, previous_hash, 0)
    }

    pub fn with_nonce(
        index: u64,
        timestamp: f64,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        nonce: u64,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            transactions,
            previous_hash: previous_hash.into(),
            nonce,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// SHA-256 (hex) over the canonical JSON of every field except `hash`.
    pub fn compute_hash(&self) -> String {
        let payload = HashPayload {
            index: self.index,
            nonce: self.nonce,
            previous_hash: &self.previous_hash,
            timestamp: self.timestamp,
            transactions: self
                .transactions
                .iter()
                .map(|t| TxPayload {
                    amount: t.amount,
                    receiver: &t.receiver,
                    sender: &t.sender,
                })
                .collect(),
        };
        // Serializing plain structs of numbers and strings cannot fail.
        let encoded = serde_json::to_vec(&payload).unwrap_or_default();
        hex::encode(Sha256::digest(&encoded))
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }
}

/// In-memory chain, always non-empty (starts with a genesis block).
#[derive(Debug, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
}

// Never empty: the genesis block is always present.
#[allow(clippy::len_without_is_empty)]
impl Blockchain {
    /// New chain whose genesis block is stamped with the current wall-clock time.
    pub fn new() -> Self {
        Self::starting_at(now_seconds())
    }

    /// New chain with a genesis block at `timestamp` (logical clocks, tests).
    pub fn starting_at(timestamp: f64) -> Self {
        let genesis = Block::new(0, timestamp, Vec::new(), GENESIS_PREVIOUS_HASH);
        Self {
            chain: vec![genesis],
        }
    }

    pub fn last_block(&self) -> &Block {
        // The genesis block is never removed.
        &self.chain[self.chain.len() - 1]
    }

    pub fn genesis(&self) -> &Block {
        &self.chain[0]
    }

    /// Append a block stamped with the current wall-clock time.
    pub fn add_block(&mut self, transactions: Vec<Transaction>) -> &Block {
        self.add_block_at(transactions, now_seconds())
    }

    /// Append a block with an explicit timestamp.
    pub fn add_block_at(&mut self, transactions: Vec<Transaction>, timestamp: f64) -> &Block {
        let block = Block::new(
            self.chain.len() as u64,
            timestamp,
            transactions,
            self.last_block().hash(),
        );
        self.chain.push(block);
        self.last_block()
    }

    /// Verify every block's hash and its link to the predecessor.
    pub fn validate(&self) -> Result<()> {
        for pair in self.chain.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);

            if current.hash != current.compute_hash() {
                warn!(index = current.index, "invalid block hash");
                return Err(Error::HashMismatch {
                    index: current.index,
                });
            }

            if current.previous_hash != previous.hash {
                warn!(
                    previous = previous.index,
                    current = current.index,
                    "broken chain link"
                );
                return Err(Error::BrokenLink {
                    previous: previous.index,
                    current: current.index,
                });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.chain.get(index)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
