//! Account record model.
//!
//! Maintains the invariant: `balance >= 0` at all times.

use crate::credential::CredentialDigest;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// One user's account, as persisted by the document store.
///
/// # Invariants
///
/// - `username` is unique across the registry and immutable after creation
/// - `balance >= 0` before and after every mutation; the store's overdraft
///   guard rejects any delta set that would violate this
///
/// Accounts are created with a zero balance at registration and are never
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier, at least 3 characters.
    pub username: String,

    /// Digest of the user's secret. The plaintext is never persisted.
    pub credential: CredentialDigest,

    /// Current balance. Never negative.
    pub balance: Money,
}

impl Account {
    /// Creates a new account with a zero balance.
    pub fn new(username: impl Into<String>, credential: CredentialDigest) -> Self {
        Account {
            username: username.into(),
            credential,
            balance: Money::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_has_zero_balance() {
        let account = Account::new("alice", CredentialDigest::from_secret("pass1"));
        assert_eq!(account.username, "alice");
        assert_eq!(account.balance, Money::ZERO);
    }

    #[test]
    fn test_account_document_round_trip() {
        let account = Account::new("alice", CredentialDigest::from_secret("pass1"));
        let json = serde_json::to_vec(&account).unwrap();
        let back: Account = serde_json::from_slice(&json).unwrap();
        assert_eq!(back, account);
        assert!(back.credential.verify("pass1"));
    }
}
