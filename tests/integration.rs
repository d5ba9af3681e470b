use std::{cell::RefCell, path::PathBuf, rc::Rc, str::from_utf8};

use teller::{
    bin_utils::{Exit, Service},
    gateway::{
        Statement, StoreError, TransactionGateway, TxOutcome, sqlite_gateway::SqliteGateway,
    },
    teller::{DEFAULT_PIN_ATTEMPTS, Teller, TellerError},
};

struct Run {
    exit: Exit,
    output: String,
    errors: Vec<String>,
}

fn run_with<G: TransactionGateway>(gateway: G, script: &str) -> Run {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&errors);
    let mut output = Vec::new();
    let service = Service {
        input: script.as_bytes(),
        output: &mut output,
        teller: Teller::new(gateway, DEFAULT_PIN_ATTEMPTS),
        error_printer: Box::new(move |err: &TellerError| sink.borrow_mut().push(err.to_string())),
    };
    let exit = service.run().unwrap();
    let errors = errors.borrow().clone();
    Run {
        exit,
        output: from_utf8(&output).unwrap().to_owned(),
        errors,
    }
}

fn run(script: &str) -> Run {
    run_with(SqliteGateway::open_in_memory().unwrap(), script)
}

/// Creates "Alice" with PIN 1234 and the given initial deposit, then logs in.
/// The first account in a fresh store gets number 10000001.
fn open_and_login(initial_deposit: &str) -> String {
    format!("2\nAlice\n1234\n{initial_deposit}\n1\n10000001\n1234\n")
}

#[test]
fn create_account_then_login_shows_balance() {
    let script = format!("{}3\n0\n0\n", open_and_login("100.00"));
    let run = run(&script);

    assert_eq!(run.exit, Exit::Closed);
    assert!(run.output.starts_with("Welcome to the ATM simulation program"));
    assert!(
        run.output
            .contains("New account successfully created, your account number is: 10000001")
    );
    assert!(run.output.contains("Account found."));
    assert!(run.output.contains("Login successful"));
    assert!(
        run.output
            .contains("Alice's account with number 10000001 balance is $100.00")
    );
    assert!(run.output.contains("Session is closed"));
    assert!(run.output.ends_with("Goodbye\n"));
    assert!(run.errors.is_empty());
}

#[test]
fn deposit_and_withdraw_are_persisted() {
    let script = format!(
        "{}1\n25.50\n2\n0.50\n0\n1\n10000001\n1234\n3\n0\n0\n",
        open_and_login("100.00")
    );
    let run = run(&script);

    assert!(run.output.contains("Successfully deposited $25.50"));
    assert!(run.output.contains("Successfully withdrawn $0.50"));
    // read back after logging in again
    assert!(run.output.contains("balance is $125.00"));
}

#[test]
fn negative_deposit_is_rejected() {
    let script = format!("{}1\n-5\n3\n0\n0\n", open_and_login("100.00"));
    let run = run(&script);

    assert!(
        run.output
            .contains("Invalid input: Deposit amount must be positive.")
    );
    assert!(run.output.contains("balance is $100.00"));
    assert!(!run.output.contains("Successfully deposited"));
}

#[test]
fn overdraft_is_rejected() {
    let script = format!("{}2\n150\n3\n0\n0\n", open_and_login("100"));
    let run = run(&script);

    assert!(run.output.contains("Invalid input: Insufficient funds."));
    assert!(run.output.contains("balance is $100"));
    assert!(!run.output.contains("Successfully withdrawn"));
}

#[test]
fn deposit_past_the_largest_balance_is_rejected() {
    // largest value a balance can hold
    let script = format!(
        "{}1\n1\n3\n0\n1\n10000001\n1234\n3\n0\n0\n",
        open_and_login("79228162514264337593543950335")
    );
    let run = run(&script);

    assert_eq!(run.exit, Exit::Closed);
    assert!(
        run.output
            .contains("Invalid input: Amount is too large for this account.")
    );
    assert!(!run.output.contains("Successfully deposited"));
    // same balance in the session and after reading it back from the store
    assert_eq!(
        run.output
            .matches("balance is $79228162514264337593543950335")
            .count(),
        2
    );
    assert!(run.errors.is_empty());
}

#[test]
fn malformed_amount_is_rejected() {
    let script = format!("{}1\nten\n3\n0\n0\n", open_and_login("1"));
    let run = run(&script);

    assert!(
        run.output
            .contains("Invalid input: `ten` is not a valid number")
    );
    assert!(run.output.contains("balance is $1"));
}

#[test]
fn three_wrong_pins_lock_the_card() {
    let script = "2\nAlice\n1234\n100\n1\n10000001\n0000\n1111\n2222\n3\n0\n0\n";
    let run = run(script);

    assert_eq!(run.exit, Exit::LockedOut);
    assert!(run.output.contains("Incorrect PIN, 2 attempts remaining"));
    assert!(run.output.contains("Incorrect PIN, 1 attempts remaining"));
    assert!(
        run.output
            .ends_with("Incorrect PIN, your card is now locked\n")
    );
    assert!(!run.output.contains("Login successful"));
}

#[test]
fn wrong_pin_then_right_pin_logs_in() {
    let script = "2\nAlice\n1234\n100\n1\n10000001\n4321\n1234\n0\n0\n";
    let run = run(script);

    assert_eq!(run.exit, Exit::Closed);
    assert!(run.output.contains("Incorrect PIN, 2 attempts remaining"));
    assert!(run.output.contains("Login successful"));
}

#[test]
fn delete_empty_account() {
    let script = format!(
        "{}4\nY\n1\n10000001\nexit\n0\n",
        open_and_login("0")
    );
    let run = run(&script);

    assert!(run.output.contains("Your account is successfully deleted"));
    // back at the main menu, the number is gone
    assert!(run.output.contains("No account found."));
    assert!(run.output.contains("Exiting..."));
    assert_eq!(run.exit, Exit::Closed);
}

#[test]
fn delete_requires_empty_balance_and_exact_confirmation() {
    let script = format!(
        "{}4\n2\n100\n4\nN\n4\ny\n3\n4\nY\n0\n",
        open_and_login("100")
    );
    let run = run(&script);

    assert!(run.output.contains(
        "You need to withdraw your remaining balance before you can delete your account"
    ));
    // no confirmation is asked while money remains
    assert_eq!(
        run.output
            .matches("Are you sure you want to delete your account? (Y/N)")
            .count(),
        3
    );
    assert_eq!(run.output.matches("Your account was not deleted").count(), 2);
    assert!(run.output.contains("balance is $0"));
    assert!(run.output.contains("Your account is successfully deleted"));
    assert_eq!(run.exit, Exit::Closed);
}

#[test]
fn account_creation_reprompts_bad_input() {
    let script = "2\nBob\n12\nabcd\n0042\n-1\nfoo\n0\n0\n";
    let run = run(script);

    assert_eq!(
        run.output
            .matches("Invalid input: PIN must be exactly 4 digits")
            .count(),
        2
    );
    assert!(run.output.contains("Invalid input: Deposit cannot be negative."));
    assert!(
        run.output
            .contains("Invalid input: `foo` is not a valid number")
    );
    assert!(
        run.output
            .contains("New account successfully created, your account number is: 10000001")
    );
}

#[test]
fn unknown_account_and_bad_menu_choices() {
    let run = run("7\n1\n55555555\nexit\n0\n");

    assert!(run.output.contains("Please enter a number between 0 and 2"));
    assert!(run.output.contains("No account found."));
    assert!(run.output.contains("Exiting..."));
    assert_eq!(run.exit, Exit::Closed);
}

#[test]
fn bad_session_choice() {
    let script = format!("{}9\n0\n0\n", open_and_login("1"));
    let run = run(&script);
    assert!(run.output.contains("Please enter a number between 0 and 4"));
}

#[test]
fn end_of_input_exits_quietly() {
    let run = run("2\nAlice\n");
    assert_eq!(run.exit, Exit::InputClosed);
    assert!(!run.output.contains("New account successfully created"));
}

/// Fails every balance update, everything else goes to SQLite.
struct BrokenUpdates(SqliteGateway);

impl TransactionGateway for BrokenUpdates {
    fn execute_with<F>(&mut self, statement: Statement, on_commit: F) -> TxOutcome
    where
        F: FnOnce(&TxOutcome),
    {
        if statement.sql().starts_with("UPDATE") {
            return TxOutcome::Failed(StoreError::Sqlite(rusqlite::Error::InvalidQuery));
        }
        self.0.execute_with(statement, on_commit)
    }
}

#[test]
fn store_failure_is_reported_and_balance_kept() {
    let script = format!("{}1\n10\n3\n0\n0\n", open_and_login("100.00"));
    let run = run_with(BrokenUpdates(SqliteGateway::open_in_memory().unwrap()), &script);

    assert!(
        run.output
            .contains("An error occurred. Your balance was not changed.")
    );
    assert!(run.output.contains("balance is $100.00"));
    assert!(!run.output.contains("Database error"));
    assert_eq!(run.errors.len(), 1);
    assert!(run.errors[0].starts_with("Database error: "));
}

#[test]
fn balance_survives_restart() {
    let path: PathBuf = std::env::temp_dir().join(format!(
        "teller-integration-{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let first = run_with(
        SqliteGateway::open(&path).unwrap(),
        "2\nAlice\n1234\n100.00\n0\n",
    );
    assert!(first.output.contains("your account number is: 10000001"));

    let second = run_with(
        SqliteGateway::open(&path).unwrap(),
        "1\n10000001\n1234\n3\n0\n0\n",
    );
    assert!(second.output.contains("balance is $100.00"));

    std::fs::remove_file(&path).unwrap();
}
