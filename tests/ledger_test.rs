//! End-to-end library tests over the in-memory store, including the
//! concurrent-access guarantees of the delta-set contract.

use bank_ledger::{BankError, Ledger, MemoryStore, Money, Session};
use std::str::FromStr;
use std::sync::Arc;
use std::thread;

fn money(s: &str) -> Money {
    Money::from_str(s).unwrap()
}

fn new_ledger() -> Ledger<MemoryStore> {
    Ledger::new(MemoryStore::new())
}

fn login(ledger: &Ledger<MemoryStore>, username: &str, secret: &str) -> Session {
    let mut session = Session::anonymous();
    ledger.login(&mut session, username, secret).unwrap();
    session
}

#[test]
fn test_full_banking_scenario() {
    let ledger = new_ledger();

    // register alice, log in, balance starts at zero
    ledger.registry().register("alice", "pass1").unwrap();
    let session = login(&ledger, "alice", "pass1");
    assert_eq!(ledger.check_balance(&session).unwrap(), Money::ZERO);

    // deposit 100
    assert_eq!(ledger.deposit(&session, money("100")).unwrap(), money("100"));

    // register bob, transfer 40 to him
    ledger.registry().register("bob", "pass2").unwrap();
    assert_eq!(
        ledger.transfer(&session, "bob", money("40")).unwrap(),
        money("60")
    );
    let bob = ledger.registry().find_by_username("bob").unwrap().unwrap();
    assert_eq!(bob.balance, money("40"));

    // overdrawn withdrawal fails and changes nothing
    assert_eq!(
        ledger.withdraw(&session, money("1000")).unwrap_err(),
        BankError::InsufficientFunds
    );
    assert_eq!(ledger.check_balance(&session).unwrap(), money("60"));
}

#[test]
fn test_registration_is_exactly_once_per_username() {
    let ledger = new_ledger();
    ledger.registry().register("alice", "pass1").unwrap();
    assert_eq!(
        ledger.registry().register("alice", "pass1").unwrap_err(),
        BankError::UsernameTaken
    );

    // the stored account is the first one, with a zero balance
    let alice = ledger.registry().find_by_username("alice").unwrap().unwrap();
    assert_eq!(alice.balance, Money::ZERO);
    assert!(alice.credential.verify("pass1"));
}

#[test]
fn test_login_failures_are_indistinguishable() {
    let ledger = new_ledger();
    ledger.registry().register("alice", "pass1").unwrap();

    let mut session = Session::anonymous();
    let wrong_secret = ledger.login(&mut session, "alice", "nope").unwrap_err();
    let unknown_user = ledger.login(&mut session, "mallory", "nope").unwrap_err();
    assert_eq!(wrong_secret, unknown_user);
}

#[test]
fn test_sessions_are_independent_contexts() {
    let ledger = new_ledger();
    ledger.registry().register("alice", "pass1").unwrap();
    ledger.registry().register("bob", "pass2").unwrap();

    let alice = login(&ledger, "alice", "pass1");
    let mut bob = login(&ledger, "bob", "pass2");

    ledger.deposit(&alice, money("10")).unwrap();
    ledger.logout(&mut bob);

    // bob logging out does not affect alice's session
    assert_eq!(ledger.check_balance(&alice).unwrap(), money("10"));
    assert_eq!(
        ledger.check_balance(&bob).unwrap_err(),
        BankError::Unauthenticated
    );
}

#[test]
fn test_concurrent_deposits_lose_no_updates() {
    let ledger = Arc::new(new_ledger());
    ledger.registry().register("alice", "pass1").unwrap();

    let threads = 8;
    let deposits_per_thread = 50;
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let session = login(&ledger, "alice", "pass1");
                for _ in 0..deposits_per_thread {
                    ledger.deposit(&session, money("1")).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let session = login(&ledger, "alice", "pass1");
    let expected = money(&(threads * deposits_per_thread).to_string());
    assert_eq!(ledger.check_balance(&session).unwrap(), expected);
}

#[test]
fn test_concurrent_transfers_conserve_total_and_never_overdraw() {
    let ledger = Arc::new(new_ledger());
    ledger.registry().register("alice", "pass1").unwrap();
    ledger.registry().register("bob", "pass2").unwrap();

    let alice = login(&ledger, "alice", "pass1");
    let bob = login(&ledger, "bob", "pass2");
    ledger.deposit(&alice, money("100")).unwrap();
    ledger.deposit(&bob, money("100")).unwrap();

    // Opposing transfer storms between the same two accounts; some fail
    // with InsufficientFunds, none may break conservation.
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let (user, secret, peer) = if i % 2 == 0 {
                    ("alice", "pass1", "bob")
                } else {
                    ("bob", "pass2", "alice")
                };
                let session = login(&ledger, user, secret);
                for _ in 0..50 {
                    match ledger.transfer(&session, peer, money("7")) {
                        Ok(_) | Err(BankError::InsufficientFunds) => {}
                        Err(e) => panic!("unexpected transfer error: {}", e),
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let alice_balance = ledger.check_balance(&alice).unwrap();
    let bob_balance = ledger.check_balance(&bob).unwrap();
    assert_eq!(alice_balance + bob_balance, money("200"));
    assert!(!alice_balance.is_negative());
    assert!(!bob_balance.is_negative());
}

#[test]
fn test_concurrent_registrations_of_same_username() {
    let ledger = Arc::new(new_ledger());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || ledger.registry().register("alice", "pass1").is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|&ok| ok)
        .count();

    assert_eq!(successes, 1);
}
