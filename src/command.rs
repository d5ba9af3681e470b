use std::str::FromStr;

use rust_decimal::{Decimal, prelude::Zero};
use thiserror::Error;

pub const PIN_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAction {
    Deposit,
    Withdraw,
}

#[derive(Debug, Clone)]
pub struct TransactionCommand {
    pub action: TransactionAction,
    pub amount: Decimal,
}

#[derive(Debug, Clone)]
pub struct OpenAccountCommand {
    pub name: String,
    pub pin: String,
    pub initial_deposit: Decimal,
}

#[derive(Debug, Error)]
pub enum AccountCommandError {
    #[error("`{input}` is not a valid number")]
    MalformedAmount { input: String },
    #[error("PIN must be exactly 4 digits")]
    MalformedPin,
    #[error("Deposit cannot be negative.")]
    NegativeDeposit,
}

/// Parses operator input into an exact decimal amount. Sign is not checked here,
/// the account decides which amounts it accepts.
pub fn parse_amount(input: &str) -> Result<Decimal, AccountCommandError> {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| AccountCommandError::MalformedAmount {
            input: trimmed.to_string(),
        })
}

impl TransactionCommand {
    pub fn parse(action: TransactionAction, input: &str) -> Result<Self, AccountCommandError> {
        Ok(Self {
            action,
            amount: parse_amount(input)?,
        })
    }
}

impl OpenAccountCommand {
    pub fn new(
        name: impl Into<String>,
        pin: &str,
        initial_deposit: Decimal,
    ) -> Result<Self, AccountCommandError> {
        Ok(Self {
            name: name.into(),
            pin: Self::parse_pin(pin)?,
            initial_deposit: Self::check_initial_deposit(initial_deposit)?,
        })
    }

    /// Accepts exactly [`PIN_LENGTH`] ASCII digits, nothing else.
    pub fn parse_pin(input: &str) -> Result<String, AccountCommandError> {
        let pin = input.trim();
        if pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit()) {
            Ok(pin.to_string())
        } else {
            Err(AccountCommandError::MalformedPin)
        }
    }

    pub fn parse_initial_deposit(input: &str) -> Result<Decimal, AccountCommandError> {
        Self::check_initial_deposit(parse_amount(input)?)
    }

    fn check_initial_deposit(amount: Decimal) -> Result<Decimal, AccountCommandError> {
        if amount >= Decimal::zero() {
            Ok(amount)
        } else {
            Err(AccountCommandError::NegativeDeposit)
        }
    }
}
