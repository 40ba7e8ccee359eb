//! # Bank Ledger
//!
//! A minimal personal-banking ledger: users register, authenticate, and move
//! funds between accounts (deposit, withdraw, transfer).
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: 2 decimal places via `rust_decimal`
//! - **Hashed credentials**: secrets stored only as SHA-256 digests
//! - **Strict invariants**: balances never go negative; a transfer commits
//!   both sides or neither
//! - **Pluggable persistence**: the core depends on a small document-store
//!   contract with an atomic delta-set primitive, with in-memory and sled
//!   implementations provided
//!
//! ## Example
//!
//! ```
//! use std::str::FromStr;
//! use bank_ledger::{Ledger, MemoryStore, Money, Session};
//!
//! let ledger = Ledger::new(MemoryStore::new());
//! ledger.registry().register("alice", "pass1").unwrap();
//!
//! let mut session = Session::anonymous();
//! ledger.login(&mut session, "alice", "pass1").unwrap();
//! let balance = ledger.deposit(&session, Money::from_str("100").unwrap()).unwrap();
//! assert_eq!(balance.to_string(), "100.00");
//! ```

pub mod account;
pub mod credential;
pub mod error;
pub mod ledger;
pub mod money;
pub mod registry;
pub mod session;
pub mod sled_store;
pub mod store;

pub use account::Account;
pub use credential::CredentialDigest;
pub use error::{BankError, Result, StoreError};
pub use ledger::Ledger;
pub use money::Money;
pub use registry::AccountRegistry;
pub use session::Session;
pub use sled_store::SledStore;
pub use store::{AccountStore, BalanceDelta, MemoryStore};
