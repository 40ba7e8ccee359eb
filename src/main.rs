//! Bank Ledger CLI
//!
//! A thin interactive front end over the core ledger: presents a text menu,
//! forwards intent to the library, and prints the returned confirmation or
//! error message verbatim.
//!
//! # Usage
//!
//! ```bash
//! cargo run                  # volatile in-memory store
//! cargo run -- ./bank-data   # durable sled store in the given directory
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use bank_ledger::{AccountStore, Ledger, MemoryStore, Money, Result, Session, SledStore};
use std::env;
use std::io::{self, BufRead, Write};
use std::process;
use std::str::FromStr;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let result = match args.get(1) {
        Some(data_dir) => match SledStore::open(data_dir) {
            Ok(store) => run(Ledger::new(store)),
            Err(e) => Err(e.into()),
        },
        None => run(Ledger::new(MemoryStore::new())),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run<S: AccountStore>(ledger: Ledger<S>) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut session = Session::anonymous();

    loop {
        let menu = if session.is_authenticated() {
            "1:Deposit\n2:Withdraw\n3:Transfer\n4:Balance\n5:Logout\n6:Exit\n"
        } else {
            "1:Register\n2:Login\n3:Exit\n"
        };

        let Some(choice) = prompt(&mut lines, menu) else {
            break;
        };

        if session.is_authenticated() {
            match choice.as_str() {
                "1" => {
                    let Some(amount) = prompt_amount(&mut lines, "Enter amount to deposit: ")
                    else {
                        continue;
                    };
                    match ledger.deposit(&session, amount) {
                        Ok(balance) => println!("Successfully Deposited!! Balance: {}", balance),
                        Err(e) => println!("{}", e),
                    }
                }
                "2" => {
                    let Some(amount) = prompt_amount(&mut lines, "Enter amount to withdraw: ")
                    else {
                        continue;
                    };
                    match ledger.withdraw(&session, amount) {
                        Ok(balance) => println!("Successfully Withdrawn!! Balance: {}", balance),
                        Err(e) => println!("{}", e),
                    }
                }
                "3" => {
                    let Some(to) = prompt(&mut lines, "Enter receiver's username: ") else {
                        break;
                    };
                    let Some(amount) = prompt_amount(&mut lines, "Enter amount to transfer: ")
                    else {
                        continue;
                    };
                    match ledger.transfer(&session, &to, amount) {
                        Ok(balance) => println!("Successfully Transferred!! Balance: {}", balance),
                        Err(e) => println!("{}", e),
                    }
                }
                "4" => match ledger.check_balance(&session) {
                    Ok(balance) => println!("Balance: {}", balance),
                    Err(e) => println!("{}", e),
                },
                "5" => {
                    ledger.logout(&mut session);
                    println!("Logged Out!!");
                }
                "6" => break,
                _ => println!("Unknown Input!!"),
            }
        } else {
            match choice.as_str() {
                "1" => {
                    let Some(username) = prompt(&mut lines, "Enter username: ") else {
                        break;
                    };
                    let Some(password) = prompt(&mut lines, "Enter password: ") else {
                        break;
                    };
                    match ledger.registry().register(&username, &password) {
                        Ok(_) => println!("Successfully Registered!!"),
                        Err(e) => println!("{}", e),
                    }
                }
                "2" => {
                    let Some(username) = prompt(&mut lines, "Enter username: ") else {
                        break;
                    };
                    let Some(password) = prompt(&mut lines, "Enter password: ") else {
                        break;
                    };
                    match ledger.login(&mut session, &username, &password) {
                        Ok(account) => println!("Welcome {}!!", account.username),
                        Err(e) => println!("{}", e),
                    }
                }
                "3" => break,
                _ => println!("Unknown Input!!"),
            }
        }
    }

    println!("Goodbye!!");
    Ok(())
}

/// Prints `message` and reads one trimmed line. `None` means end of input.
fn prompt<B: BufRead>(lines: &mut io::Lines<B>, message: &str) -> Option<String> {
    print!("{}", message);
    let _ = io::stdout().flush();
    let line = lines.next()?.ok()?;
    Some(line.trim().to_string())
}

/// Prompts for a monetary amount, re-reporting unparsable input to the user.
fn prompt_amount<B: BufRead>(lines: &mut io::Lines<B>, message: &str) -> Option<Money> {
    let raw = prompt(lines, message)?;
    match Money::from_str(&raw) {
        Ok(amount) => Some(amount),
        Err(_) => {
            println!("Invalid Amount!!");
            None
        }
    }
}
