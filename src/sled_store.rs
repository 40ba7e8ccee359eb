//! Durable account store backed by `sled`.
//!
//! Documents are JSON-encoded [`Account`] records keyed by username.
//! Registration uses compare-and-swap for the insert-if-absent guarantee;
//! delta sets run inside a single sled transaction spanning every touched
//! key, so a transfer commits both sides or neither.

use crate::account::Account;
use crate::error::StoreError;
use crate::store::{AccountStore, BalanceDelta};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::path::Path;

/// Account store persisted to a sled tree on disk.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Opens (or creates) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(SledStore { db })
    }

    fn encode(account: &Account) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(account).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<Account, StoreError> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl AccountStore for SledStore {
    fn find_one(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let raw = self
            .db
            .get(username.as_bytes())
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        raw.map(|bytes| Self::decode(&bytes)).transpose()
    }

    fn insert_one(&self, account: Account) -> Result<(), StoreError> {
        let bytes = Self::encode(&account)?;

        let swap = self
            .db
            .compare_and_swap(account.username.as_bytes(), None::<&[u8]>, Some(bytes))
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if swap.is_err() {
            return Err(StoreError::DuplicateUsername(account.username));
        }

        self.flush()
    }

    fn apply_deltas(&self, deltas: &[BalanceDelta]) -> Result<Vec<Account>, StoreError> {
        let result = self.db.transaction(|tx| {
            let mut committed = Vec::with_capacity(deltas.len());

            for delta in deltas {
                let key = delta.username.as_bytes();
                let raw = tx.get(key)?.ok_or_else(|| {
                    ConflictableTransactionError::Abort(StoreError::AccountMissing(
                        delta.username.clone(),
                    ))
                })?;

                let mut account =
                    Self::decode(&raw).map_err(ConflictableTransactionError::Abort)?;
                account.balance += delta.amount;
                if account.balance.is_negative() {
                    return Err(ConflictableTransactionError::Abort(
                        StoreError::WouldOverdraw(delta.username.clone()),
                    ));
                }

                let bytes = Self::encode(&account).map_err(ConflictableTransactionError::Abort)?;
                tx.insert(key, bytes)?;
                committed.push(account);
            }

            Ok(committed)
        });

        let committed = match result {
            Ok(committed) => committed,
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(e)) => {
                return Err(StoreError::Unavailable(e.to_string()))
            }
        };

        self.flush()?;
        Ok(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::CredentialDigest;
    use crate::money::Money;
    use std::str::FromStr;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    fn open_temp() -> (tempfile::TempDir, SledStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_insert_is_insert_if_absent() {
        let (_dir, store) = open_temp();
        store
            .insert_one(Account::new("alice", CredentialDigest::from_secret("pass1")))
            .unwrap();

        let err = store
            .insert_one(Account::new("alice", CredentialDigest::from_secret("other")))
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateUsername("alice".to_string()));

        // First document untouched
        let found = store.find_one("alice").unwrap().unwrap();
        assert!(found.credential.verify("pass1"));
    }

    #[test]
    fn test_delta_set_commits_both_sides_or_neither() {
        let (_dir, store) = open_temp();
        store
            .insert_one(Account::new("alice", CredentialDigest::from_secret("pass1")))
            .unwrap();
        store
            .insert_one(Account::new("bob", CredentialDigest::from_secret("pass2")))
            .unwrap();
        store
            .apply_deltas(&[BalanceDelta::credit("alice", money("100"))])
            .unwrap();

        let updated = store
            .apply_deltas(&[
                BalanceDelta::debit("alice", money("40")),
                BalanceDelta::credit("bob", money("40")),
            ])
            .unwrap();
        assert_eq!(updated[0].balance, money("60"));
        assert_eq!(updated[1].balance, money("40"));

        let err = store
            .apply_deltas(&[
                BalanceDelta::debit("alice", money("500")),
                BalanceDelta::credit("bob", money("500")),
            ])
            .unwrap_err();
        assert_eq!(err, StoreError::WouldOverdraw("alice".to_string()));
        assert_eq!(store.find_one("alice").unwrap().unwrap().balance, money("60"));
        assert_eq!(store.find_one("bob").unwrap().unwrap().balance, money("40"));
    }
}
