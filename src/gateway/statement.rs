use rusqlite::types::Value;
use rust_decimal::Decimal;

use crate::account::AccountId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    None,
    One,
}

/// A parameterized statement. Values are always bound, never spliced into SQL.
#[derive(Debug, Clone)]
pub struct Statement {
    sql: &'static str,
    params: Vec<Value>,
    fetch: Fetch,
    generates_key: bool,
}

impl Statement {
    pub fn new(sql: &'static str, params: Vec<Value>, fetch: Fetch) -> Self {
        Self {
            sql,
            params,
            fetch,
            generates_key: false,
        }
    }

    /// Marks an insert whose generated row id should be reported back.
    pub fn returning_generated_key(mut self) -> Self {
        self.generates_key = true;
        self
    }

    pub fn sql(&self) -> &'static str {
        self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn fetch(&self) -> Fetch {
        self.fetch
    }

    pub fn generates_key(&self) -> bool {
        self.generates_key
    }

    pub fn insert_account(name: &str, pin: &str, balance: Decimal) -> Self {
        Self::new(
            "INSERT INTO accounts (name, pin, balance) VALUES (?1, ?2, ?3)",
            vec![
                Value::Text(name.to_string()),
                Value::Text(pin.to_string()),
                Value::Text(balance.to_string()),
            ],
            Fetch::None,
        )
        .returning_generated_key()
    }

    pub fn select_account_number(id: AccountId) -> Self {
        Self::new(
            "SELECT account_number FROM accounts WHERE id = ?1",
            vec![Value::Integer(id)],
            Fetch::One,
        )
    }

    pub fn select_account(account_number: &str) -> Self {
        Self::new(
            "SELECT id, account_number, name, pin, balance FROM accounts WHERE account_number = ?1",
            vec![Value::Text(account_number.to_string())],
            Fetch::One,
        )
    }

    pub fn update_balance(account_number: &str, balance: Decimal) -> Self {
        Self::new(
            "UPDATE accounts SET balance = ?1 WHERE account_number = ?2",
            vec![
                Value::Text(balance.to_string()),
                Value::Text(account_number.to_string()),
            ],
            Fetch::None,
        )
    }

    pub fn delete_account(account_number: &str) -> Self {
        Self::new(
            "DELETE FROM accounts WHERE account_number = ?1",
            vec![Value::Text(account_number.to_string())],
            Fetch::None,
        )
    }

    /// Removes a row that never got a public account number.
    pub fn delete_account_by_id(id: AccountId) -> Self {
        Self::new(
            "DELETE FROM accounts WHERE id = ?1",
            vec![Value::Integer(id)],
            Fetch::None,
        )
    }
}
