//! Error types for the banking ledger.
//!
//! Every failure is returned as a value; the core never retries on its own
//! and never maps a validation failure onto a raw system fault. The front
//! end prints the `Display` text of these errors verbatim.

use crate::registry::{MIN_SECRET_LEN, MIN_USERNAME_LEN};
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BankError>;

/// Errors surfaced by the registry, session, and ledger operations.
///
/// All variants except `Store` are recoverable validation failures: no
/// mutation has been performed and the caller may simply retry with
/// corrected input. `Store` wraps a transient persistence failure; retry
/// policy belongs to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankError {
    /// Registration with a username shorter than the minimum
    #[error("username must be at least {MIN_USERNAME_LEN} characters")]
    InvalidUsername,

    /// Registration with a secret shorter than the minimum
    #[error("password must be at least {MIN_SECRET_LEN} characters")]
    InvalidSecret,

    /// Registration conflict on an existing username
    #[error("username has already been taken")]
    UsernameTaken,

    /// Login failure. Deliberately identical for an unknown username and a
    /// wrong secret, so callers cannot probe which usernames exist.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// A ledger operation attempted without an authenticated session
    #[error("not logged in")]
    Unauthenticated,

    /// Deposit, withdrawal, or transfer of a zero or negative amount
    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    /// Withdrawal or transfer exceeding the current balance
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Transfer to a username with no account
    #[error("recipient does not exist")]
    RecipientNotFound,

    /// Transfer where sender and recipient are the same account
    #[error("cannot transfer to your own account")]
    SelfTransfer,

    /// The persistent store could not complete a read or write
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by an [`AccountStore`](crate::store::AccountStore)
/// implementation.
///
/// `DuplicateUsername`, `AccountMissing`, and `WouldOverdraw` are contract
/// violations the registry and ledger translate into the matching
/// [`BankError`]; `Unavailable` and `Corrupt` are transient persistence
/// failures surfaced to the caller as-is. A failed delta set is never
/// partially applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Insert rejected by the uniqueness guarantee on `username`
    #[error("an account named {0} already exists")]
    DuplicateUsername(String),

    /// A delta referenced a username with no stored account
    #[error("no account named {0}")]
    AccountMissing(String),

    /// A delta set would drive a balance below zero
    #[error("balance of {0} would go negative")]
    WouldOverdraw(String),

    /// The store could not complete the read/write; retryable by the caller
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored document failed to decode
    #[error("corrupt account document: {0}")]
    Corrupt(String),
}
