//! Append-only ledger.
//!
//! Totally ordered, hash-chained sequence of transactions. Indexed by data
//! hash and transaction type for the verification and workflow queries.

use crate::core::{now, Hash256, Timestamp};
use crate::ledger::transaction::{LedgerTransaction, TransactionPayload, TransactionType};
use std::collections::HashMap;

/// Result of chain verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerVerification {
    /// Whether the chain is valid
    pub valid: bool,
    /// Number of transactions verified
    pub transactions_verified: u64,
    /// Whether a transaction's content no longer matches its hash
    pub tamper_detected: bool,
    /// Sequence of the first invalid transaction (if any)
    pub first_invalid_sequence: Option<u64>,
}

/// The ledger. Entries are never modified or removed once appended.
#[derive(Debug)]
pub struct Ledger {
    transactions: Vec<LedgerTransaction>,
    by_data_hash: HashMap<Hash256, Vec<usize>>,
    by_type: HashMap<TransactionType, Vec<usize>>,
    created: Timestamp,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            by_data_hash: HashMap::new(),
            by_type: HashMap::new(),
            created: now(),
        }
    }

    /// Ledger creation time.
    pub fn created(&self) -> Timestamp {
        self.created
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Hash of the last transaction, or the zero hash when empty.
    pub fn head_hash(&self) -> Hash256 {
        self.transactions
            .last()
            .map(|tx| tx.tx_hash.clone())
            .unwrap_or_default()
    }

    /// Append a transaction to the end of the ledger.
    pub fn append(
        &mut self,
        actor: &str,
        data_hash: Hash256,
        payload: TransactionPayload,
    ) -> LedgerTransaction {
        let index = self.transactions.len();
        let tx = LedgerTransaction::new(
            index as u64,
            now(),
            actor,
            data_hash,
            payload,
            self.head_hash(),
        );

        self.by_data_hash
            .entry(tx.data_hash.clone())
            .or_default()
            .push(index);
        self.by_type
            .entry(tx.transaction_type())
            .or_default()
            .push(index);

        tracing::info!(
            sequence = tx.sequence,
            tx_type = %tx.transaction_type(),
            actor = %tx.actor,
            data_hash = %tx.data_hash,
            "ledger transaction appended"
        );

        self.transactions.push(tx.clone());
        tx
    }

    /// Owned copy of every transaction, in order.
    pub fn all(&self) -> Vec<LedgerTransaction> {
        self.transactions.clone()
    }

    /// Borrow every transaction, in order.
    pub fn transactions(&self) -> &[LedgerTransaction] {
        &self.transactions
    }

    /// Get transaction by sequence number.
    pub fn get(&self, sequence: u64) -> Option<&LedgerTransaction> {
        self.transactions.get(sequence as usize)
    }

    /// First transaction recorded with this data hash.
    pub fn find_by_data_hash(&self, hash: &Hash256) -> Option<&LedgerTransaction> {
        self.by_data_hash
            .get(hash)
            .and_then(|positions| positions.first())
            .map(|&i| &self.transactions[i])
    }

    /// Every transaction recorded with this data hash, in order.
    pub fn find_all_by_data_hash(&self, hash: &Hash256) -> Vec<&LedgerTransaction> {
        self.by_data_hash
            .get(hash)
            .map(|positions| positions.iter().map(|&i| &self.transactions[i]).collect())
            .unwrap_or_default()
    }

    /// Transactions of one type, in order.
    pub fn filter_by_type(&self, tx_type: TransactionType) -> Vec<&LedgerTransaction> {
        self.by_type
            .get(&tx_type)
            .map(|positions| positions.iter().map(|&i| &self.transactions[i]).collect())
            .unwrap_or_default()
    }

    /// Transactions performed by one DID, in order.
    pub fn by_actor(&self, actor: &str) -> Vec<&LedgerTransaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.actor == actor)
            .collect()
    }

    /// Most recent transactions, newest first.
    pub fn recent(&self, count: usize) -> Vec<&LedgerTransaction> {
        self.transactions.iter().rev().take(count).collect()
    }

    /// Verify this ledger's chain integrity.
    pub fn verify(&self) -> LedgerVerification {
        verify_chain(&self.transactions)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Verify a sequence of transactions, e.g. an exported snapshot.
///
/// Checks dense sequence numbers, parent links, and content hashes; stops at
/// the first invalid entry.
pub fn verify_chain(transactions: &[LedgerTransaction]) -> LedgerVerification {
    let mut verification = LedgerVerification {
        valid: true,
        transactions_verified: 0,
        tamper_detected: false,
        first_invalid_sequence: None,
    };

    let mut expected_parent = Hash256::zero();
    for (i, tx) in transactions.iter().enumerate() {
        let tampered = !tx.is_intact();
        let linked = tx.sequence == i as u64 && tx.parent_hash == expected_parent;

        if tampered || !linked {
            verification.valid = false;
            verification.tamper_detected = tampered;
            verification.first_invalid_sequence = Some(i as u64);
            break;
        }

        expected_parent = tx.tx_hash.clone();
        verification.transactions_verified += 1;
    }

    verification
}
