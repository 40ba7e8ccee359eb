//! Persistent document-store contract and the in-process implementation.
//!
//! The core depends only on this contract: a username-keyed document store
//! with a uniqueness guarantee on insert and an atomic "apply ledger delta
//! set" primitive. Both sides of a transfer are one delta set, so no caller
//! can observe a debited-but-not-credited state.

use crate::account::Account;
use crate::error::StoreError;
use crate::money::Money;
use std::collections::HashMap;
use std::sync::Mutex;

/// A signed amount to apply to one account's balance.
#[derive(Debug, Clone)]
pub struct BalanceDelta {
    /// Account to mutate.
    pub username: String,

    /// Signed amount: positive credits, negative debits.
    pub amount: Money,
}

impl BalanceDelta {
    /// A delta that increases `username`'s balance by `amount`.
    pub fn credit(username: impl Into<String>, amount: Money) -> Self {
        BalanceDelta {
            username: username.into(),
            amount,
        }
    }

    /// A delta that decreases `username`'s balance by `amount`.
    pub fn debit(username: impl Into<String>, amount: Money) -> Self {
        BalanceDelta {
            username: username.into(),
            amount: -amount,
        }
    }
}

/// Contract for the authoritative account store.
///
/// Implementations must guarantee:
///
/// - `insert_one` is insert-if-absent: two concurrent inserts of the same
///   username cannot both succeed
/// - `apply_deltas` applies the whole set atomically, rejecting it with
///   [`StoreError::WouldOverdraw`] if any resulting balance would be
///   negative. Either every delta commits or none does.
pub trait AccountStore: Send + Sync {
    /// Looks up the account document for `username`.
    fn find_one(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Inserts a new account document; fails with
    /// [`StoreError::DuplicateUsername`] if one already exists.
    fn insert_one(&self, account: Account) -> Result<(), StoreError>;

    /// Atomically applies a set of balance deltas.
    ///
    /// Returns the committed documents in delta order.
    fn apply_deltas(&self, deltas: &[BalanceDelta]) -> Result<Vec<Account>, StoreError>;
}

/// In-process store over a mutex-guarded map.
///
/// A single lock spans each call, so every operation is trivially atomic
/// with respect to the others. Suitable for tests and for running the front
/// end without a data directory; nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Account>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn find_one(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let documents = self.documents.lock().expect("store lock poisoned");
        Ok(documents.get(username).cloned())
    }

    fn insert_one(&self, account: Account) -> Result<(), StoreError> {
        let mut documents = self.documents.lock().expect("store lock poisoned");
        if documents.contains_key(&account.username) {
            return Err(StoreError::DuplicateUsername(account.username));
        }
        documents.insert(account.username.clone(), account);
        Ok(())
    }

    fn apply_deltas(&self, deltas: &[BalanceDelta]) -> Result<Vec<Account>, StoreError> {
        let mut documents = self.documents.lock().expect("store lock poisoned");

        // Stage every mutation before touching the map, so a failed set
        // leaves no partial application behind.
        let mut staged: HashMap<String, Account> = HashMap::new();
        let mut committed = Vec::with_capacity(deltas.len());

        for delta in deltas {
            let mut account = match staged.get(&delta.username) {
                Some(account) => account.clone(),
                None => documents
                    .get(&delta.username)
                    .cloned()
                    .ok_or_else(|| StoreError::AccountMissing(delta.username.clone()))?,
            };

            account.balance += delta.amount;
            if account.balance.is_negative() {
                return Err(StoreError::WouldOverdraw(delta.username.clone()));
            }

            staged.insert(delta.username.clone(), account.clone());
            committed.push(account);
        }

        for account in staged.into_values() {
            documents.insert(account.username.clone(), account);
        }

        Ok(committed)
    }
}
