use std::fmt;

use rust_decimal::{Decimal, prelude::Zero};
use thiserror::Error;

use crate::command::{TransactionAction, TransactionCommand};

/// Surrogate key assigned by the store.
pub type AccountId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEventKind {
    Deposited,
    Withdrawn,
}

/// A validated balance change that has not been applied yet.
#[derive(Debug, Clone)]
pub struct AccountEvent {
    amount: Decimal,
    kind: AccountEventKind,
    balance_after: Decimal,
}

impl AccountEvent {
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> AccountEventKind {
        self.kind
    }

    /// Balance the account will hold once this event is applied.
    pub fn balance_after(&self) -> Decimal {
        self.balance_after
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{action:?} amount must be positive.")]
    InvalidAmount { action: TransactionAction },
    #[error("Insufficient funds.")]
    InsufficientFunds,
    #[error("Amount is too large for this account.")]
    AmountTooLarge,
    #[error("You need to withdraw your remaining balance before you can delete your account")]
    BalanceRemaining,
}

#[derive(Clone, PartialEq)]
pub struct Account {
    id: AccountId,
    account_number: String,
    name: String,
    pin: String,
    balance: Decimal,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("account_number", &self.account_number)
            .field("name", &self.name)
            .field("pin", &"****")
            .field("balance", &self.balance)
            .finish()
    }
}

impl Account {
    pub fn new(
        id: AccountId,
        account_number: impl Into<String>,
        name: impl Into<String>,
        pin: impl Into<String>,
        balance: Decimal,
    ) -> Self {
        Self {
            id,
            account_number: account_number.into(),
            name: name.into(),
            pin: pin.into(),
            balance,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// PINs are compared as plain strings, exactly as stored.
    pub fn pin_matches(&self, candidate: &str) -> bool {
        self.pin == candidate
    }

    /// The event carries the balance it was validated against, so applying
    /// it does no arithmetic of its own.
    pub fn apply(&mut self, event: &AccountEvent) {
        self.balance = event.balance_after;
    }

    pub fn handle_transaction(
        &self,
        command: &TransactionCommand,
    ) -> Result<AccountEvent, AccountError> {
        if command.amount <= Decimal::zero() {
            return Err(AccountError::InvalidAmount {
                action: command.action,
            });
        }

        match command.action {
            TransactionAction::Deposit => {
                let balance_after = self
                    .balance
                    .checked_add(command.amount)
                    .ok_or(AccountError::AmountTooLarge)?;
                Ok(AccountEvent {
                    amount: command.amount,
                    kind: AccountEventKind::Deposited,
                    balance_after,
                })
            }
            TransactionAction::Withdraw => {
                if self.balance >= command.amount {
                    Ok(AccountEvent {
                        amount: command.amount,
                        kind: AccountEventKind::Withdrawn,
                        balance_after: self.balance - command.amount,
                    })
                } else {
                    Err(AccountError::InsufficientFunds)
                }
            }
        }
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        self.handle_and_apply(TransactionAction::Deposit, amount)
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), AccountError> {
        self.handle_and_apply(TransactionAction::Withdraw, amount)
    }

    fn handle_and_apply(
        &mut self,
        action: TransactionAction,
        amount: Decimal,
    ) -> Result<(), AccountError> {
        let event = self.handle_transaction(&TransactionCommand { action, amount })?;
        self.apply(&event);
        Ok(())
    }

    pub fn check_balance(&self) -> String {
        format!(
            "{}'s account with number {} balance is ${}",
            self.name, self.account_number, self.balance
        )
    }

    /// Only an empty account may be deleted.
    pub fn ensure_closable(&self) -> Result<(), AccountError> {
        if self.balance.is_zero() {
            Ok(())
        } else {
            Err(AccountError::BalanceRemaining)
        }
    }
}
