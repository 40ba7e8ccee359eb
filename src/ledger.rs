//! Ledger operations: authentication and balance mutation.
//!
//! Every operation validates its inputs, checks the session, and applies
//! balance changes through the registry's atomic delta-set contract. The
//! two sides of a transfer are one delta set, so the sum of sender and
//! recipient balances is conserved and no partially-applied transfer is
//! ever observable.

use crate::account::Account;
use crate::error::{BankError, Result, StoreError};
use crate::money::Money;
use crate::registry::AccountRegistry;
use crate::session::Session;
use crate::store::{AccountStore, BalanceDelta};
use log::debug;
use std::sync::Arc;

/// The banking ledger over a pluggable account store.
///
/// Takes `&self` everywhere and holds its registry behind an `Arc`, so one
/// ledger can serve any number of interaction contexts concurrently, each
/// with its own [`Session`].
pub struct Ledger<S: AccountStore> {
    registry: Arc<AccountRegistry<S>>,
}

impl<S: AccountStore> Clone for Ledger<S> {
    fn clone(&self) -> Self {
        Ledger {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<S: AccountStore> Ledger<S> {
    /// Creates a ledger over the given store.
    pub fn new(store: S) -> Self {
        Ledger {
            registry: Arc::new(AccountRegistry::new(store)),
        }
    }

    /// The underlying account registry.
    pub fn registry(&self) -> &AccountRegistry<S> {
        &self.registry
    }

    /// Authenticates `username` with `secret` and binds the session.
    ///
    /// Fails with [`BankError::InvalidCredentials`] for an unknown username
    /// and for a wrong secret alike; callers cannot tell which it was.
    pub fn login(&self, session: &mut Session, username: &str, secret: &str) -> Result<Account> {
        match self.registry.find_by_username(username)? {
            Some(account) if account.credential.verify(secret) => {
                session.bind(&account.username);
                debug!("session bound to {}", account.username);
                Ok(account)
            }
            _ => Err(BankError::InvalidCredentials),
        }
    }

    /// Clears the session. Idempotent; succeeds even when nobody is logged in.
    pub fn logout(&self, session: &mut Session) {
        if let Some(username) = session.current() {
            debug!("session for {} cleared", username);
        }
        session.clear();
    }

    /// Adds `amount` to the authenticated account's balance.
    ///
    /// Returns the new balance. Applied as a store-side increment, not a
    /// read-modify-write of any cached value, so concurrent deposits cannot
    /// lose updates.
    pub fn deposit(&self, session: &Session, amount: Money) -> Result<Money> {
        let username = authenticated(session)?;
        require_positive(amount)?;

        let committed = self
            .registry
            .apply_deltas(&[BalanceDelta::credit(username, amount)])
            .map_err(map_store_error)?;
        let balance = new_balance(committed);
        debug!("deposited {} to {}", amount, username);
        Ok(balance)
    }

    /// Removes `amount` from the authenticated account's balance.
    ///
    /// Returns the new balance. The overdraft check runs inside the store's
    /// atomic update, against the balance the update reads, so a stale
    /// mirror or a concurrent withdrawal cannot drive the balance negative.
    pub fn withdraw(&self, session: &Session, amount: Money) -> Result<Money> {
        let username = authenticated(session)?;
        require_positive(amount)?;

        let committed = self
            .registry
            .apply_deltas(&[BalanceDelta::debit(username, amount)])
            .map_err(map_store_error)?;
        let balance = new_balance(committed);
        debug!("withdrew {} from {}", amount, username);
        Ok(balance)
    }

    /// Moves `amount` from the authenticated account to `to`.
    ///
    /// Returns the sender's new balance. Debit and credit go through the
    /// store as one transactional delta set. Self-transfer is rejected
    /// outright rather than treated as a no-op.
    pub fn transfer(&self, session: &Session, to: &str, amount: Money) -> Result<Money> {
        let username = authenticated(session)?;
        require_positive(amount)?;
        if to == username {
            return Err(BankError::SelfTransfer);
        }
        if !self.registry.exists(to)? {
            return Err(BankError::RecipientNotFound);
        }

        let committed = self
            .registry
            .apply_deltas(&[
                BalanceDelta::debit(username, amount),
                BalanceDelta::credit(to, amount),
            ])
            .map_err(|e| match e {
                // Recipient raced away between the existence check and the
                // commit; cannot happen while accounts are never deleted,
                // but map it to the precise error all the same.
                StoreError::AccountMissing(name) if name == to => BankError::RecipientNotFound,
                other => map_store_error(other),
            })?;
        let balance = new_balance(committed);
        debug!("transferred {} from {} to {}", amount, username, to);
        Ok(balance)
    }

    /// Returns the authenticated account's current balance.
    ///
    /// Reads the authoritative store, never the mirror.
    pub fn check_balance(&self, session: &Session) -> Result<Money> {
        let username = authenticated(session)?;
        let account = self
            .registry
            .find_by_username(username)?
            .ok_or_else(|| StoreError::AccountMissing(username.to_string()))?;
        Ok(account.balance)
    }
}

fn authenticated(session: &Session) -> Result<&str> {
    session.current().ok_or(BankError::Unauthenticated)
}

fn require_positive(amount: Money) -> Result<()> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(BankError::NonPositiveAmount)
    }
}

fn map_store_error(e: StoreError) -> BankError {
    match e {
        StoreError::WouldOverdraw(_) => BankError::InsufficientFunds,
        other => BankError::Store(other),
    }
}

/// Extracts the caller's new balance from a committed delta set.
fn new_balance(committed: Vec<Account>) -> Money {
    // Safety: the caller's delta is always first in the set, and the store
    // returns one committed document per delta.
    committed
        .into_iter()
        .next()
        .map(|account| account.balance)
        .expect("store returns one document per delta")
}
