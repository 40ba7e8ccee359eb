//! Account registry: validation, registration, and lookup.
//!
//! The registry owns the authoritative store and a write-through in-memory
//! mirror. The mirror write lock is held across each persisted write, so
//! mirror updates land in the same order as store commits. The mirror is
//! strictly secondary: balance reads go to the store, and the mirror only
//! short-circuits existence checks (accounts are never deleted, so a hit is
//! conclusive; a miss falls through to the store).

use crate::account::Account;
use crate::credential::CredentialDigest;
use crate::error::{BankError, Result, StoreError};
use crate::store::{AccountStore, BalanceDelta};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::RwLock;

/// Minimum username length accepted at registration.
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum secret length accepted at registration.
pub const MIN_SECRET_LEN: usize = 4;

/// Authoritative mapping from username to account record.
pub struct AccountRegistry<S: AccountStore> {
    store: S,
    mirror: RwLock<HashMap<String, Account>>,
}

impl<S: AccountStore> AccountRegistry<S> {
    /// Creates a registry over the given store.
    pub fn new(store: S) -> Self {
        AccountRegistry {
            store,
            mirror: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new account with a zero balance.
    ///
    /// Validates username and secret length, hashes the secret, and relies
    /// on the store's insert-if-absent guarantee for uniqueness, so two
    /// concurrent registrations of the same username cannot both succeed.
    /// The account is lookup-able as soon as this returns.
    pub fn register(&self, username: &str, secret: &str) -> Result<Account> {
        if username.len() < MIN_USERNAME_LEN {
            return Err(BankError::InvalidUsername);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(BankError::InvalidSecret);
        }

        let account = Account::new(username, CredentialDigest::from_secret(secret));

        // Lock ordering: mirror lock taken before the durable write so the
        // mirror sees commits in store order.
        let mut mirror = self.mirror.write().expect("mirror lock poisoned");
        match self.store.insert_one(account.clone()) {
            Ok(()) => {
                mirror.insert(account.username.clone(), account.clone());
                debug!("registered account {}", account.username);
                Ok(account)
            }
            Err(StoreError::DuplicateUsername(_)) => {
                debug!("registration conflict on username {}", username);
                Err(BankError::UsernameTaken)
            }
            Err(e) => {
                warn!("registration of {} failed: {}", username, e);
                Err(e.into())
            }
        }
    }

    /// Authoritative lookup by username.
    ///
    /// Always reads the store, never the mirror, so a completed mutation on
    /// the account is reflected here. Refreshes the mirror entry on a hit.
    pub fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let found = self.store.find_one(username)?;
        if let Some(account) = &found {
            let mut mirror = self.mirror.write().expect("mirror lock poisoned");
            mirror.insert(account.username.clone(), account.clone());
        }
        Ok(found)
    }

    /// Returns whether an account exists for `username`.
    ///
    /// Mirror hits are conclusive because accounts are never deleted; a miss
    /// falls back to the store.
    pub fn exists(&self, username: &str) -> Result<bool> {
        {
            let mirror = self.mirror.read().expect("mirror lock poisoned");
            if mirror.contains_key(username) {
                return Ok(true);
            }
        }
        Ok(self.find_by_username(username)?.is_some())
    }

    /// Atomically applies a delta set through the store and refreshes the
    /// mirror from the committed documents.
    pub(crate) fn apply_deltas(
        &self,
        deltas: &[BalanceDelta],
    ) -> std::result::Result<Vec<Account>, StoreError> {
        let mut mirror = self.mirror.write().expect("mirror lock poisoned");
        let committed = self.store.apply_deltas(deltas)?;
        for account in &committed {
            mirror.insert(account.username.clone(), account.clone());
        }
        Ok(committed)
    }
}
