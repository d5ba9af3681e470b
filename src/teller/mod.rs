use thiserror::Error;
use tracing::{info, warn};

use crate::{
    account::{Account, AccountError, AccountEvent, AccountEventKind},
    command::{AccountCommandError, OpenAccountCommand, TransactionCommand},
    gateway::{Statement, StoreError, StoreRow, TransactionGateway, TxOutcome},
};

pub mod login;

pub use login::{PinChallenge, PinOutcome};

pub const DEFAULT_PIN_ATTEMPTS: u8 = 3;

#[derive(Debug, Error)]
pub enum TellerError {
    #[error(transparent)]
    CommandErr(#[from] AccountCommandError),
    #[error(transparent)]
    AccountErr(#[from] AccountError),
    #[error("Database error: {0}")]
    StoreErr(#[from] StoreError),
    #[error("New ID could not be retrieved, the account may be in an unknown state")]
    GeneratedKeyMissing,
    #[error("Account was created but account number could not be retrieved")]
    AccountNumberUnavailable,
    #[error("Account {account_number} no longer exists")]
    AccountMissing { account_number: String },
    #[error("Incorrect PIN entered {attempts} times, your card is now locked")]
    AuthenticationExhausted { attempts: u8 },
}

impl TellerError {
    /// Validation problems the operator can fix by entering something else.
    pub fn is_recoverable_input(&self) -> bool {
        matches!(self, Self::CommandErr(_) | Self::AccountErr(_))
    }
}

/// Banking operations, each persisted through a [`TransactionGateway`].
pub struct Teller<G> {
    gateway: G,
    max_pin_attempts: u8,
}

impl<G> Teller<G>
where
    G: TransactionGateway,
{
    pub fn new(gateway: G, max_pin_attempts: u8) -> Self {
        Self {
            gateway,
            max_pin_attempts: max_pin_attempts.max(1),
        }
    }

    #[cfg(test)]
    pub(crate) fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    pub fn into_gateway(self) -> G {
        self.gateway
    }

    /// Inserts the row, then reads back the account number the store assigned.
    /// A row whose number cannot be read is deleted again.
    pub fn open_account(&mut self, command: OpenAccountCommand) -> Result<Account, TellerError> {
        let summary = self
            .gateway
            .execute(Statement::insert_account(
                &command.name,
                &command.pin,
                command.initial_deposit,
            ))
            .into_summary()?;
        let Some(id) = summary.generated_id else {
            warn!(
                rows_affected = summary.rows_affected,
                "insert committed without a generated id"
            );
            return Err(TellerError::GeneratedKeyMissing);
        };

        let account_number = match self.gateway.execute(Statement::select_account_number(id)) {
            TxOutcome::Fetched(Some(row)) => row.text("account_number").ok(),
            _ => None,
        };
        let Some(account_number) = account_number else {
            self.discard_orphan(id);
            return Err(TellerError::AccountNumberUnavailable);
        };

        info!(id, %account_number, "account opened");
        Ok(Account::new(
            id,
            account_number,
            command.name,
            command.pin,
            command.initial_deposit,
        ))
    }

    fn discard_orphan(&mut self, id: i64) {
        match self
            .gateway
            .execute(Statement::delete_account_by_id(id))
            .into_summary()
        {
            Ok(summary) => warn!(id, rows = summary.rows_affected, "removed account without number"),
            Err(err) => warn!(id, %err, "could not remove account without number"),
        }
    }

    pub fn find_account(&mut self, account_number: &str) -> Result<Option<Account>, TellerError> {
        let row = self
            .gateway
            .execute(Statement::select_account(account_number.trim()))
            .into_row()?;
        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    /// Starts the PIN check for an account that was found by number.
    pub fn challenge(&self, account: Account) -> PinChallenge {
        PinChallenge::new(account, self.max_pin_attempts)
    }

    /// Validates against the in-memory account, persists the resulting
    /// balance, and only then applies the change in memory. On failure both
    /// sides keep the old balance.
    pub fn transact(
        &mut self,
        account: &mut Account,
        command: TransactionCommand,
    ) -> Result<AccountEvent, TellerError> {
        let event = account.handle_transaction(&command)?;
        let summary = self
            .gateway
            .execute_with(
                Statement::update_balance(account.account_number(), event.balance_after()),
                |outcome| {
                    if matches!(outcome, TxOutcome::Done(summary) if summary.rows_affected > 0) {
                        account.apply(&event);
                    }
                },
            )
            .into_summary()?;
        if summary.rows_affected == 0 {
            return Err(TellerError::AccountMissing {
                account_number: account.account_number().to_string(),
            });
        }

        info!(
            account_number = account.account_number(),
            kind = ?event.kind(),
            amount = %event.amount(),
            "balance updated"
        );
        Ok(event)
    }

    /// Consumes the account: after a successful delete it no longer exists.
    /// On failure the account is handed back.
    pub fn close_account(&mut self, account: Account) -> Result<(), (Account, TellerError)> {
        if let Err(err) = account.ensure_closable() {
            return Err((account, err.into()));
        }
        let outcome = self
            .gateway
            .execute(Statement::delete_account(account.account_number()));
        match outcome.into_summary() {
            Ok(summary) if summary.rows_affected > 0 => {
                info!(account_number = account.account_number(), "account deleted");
                Ok(())
            }
            Ok(_) => {
                let account_number = account.account_number().to_string();
                Err((account, TellerError::AccountMissing { account_number }))
            }
            Err(err) => Err((account, err.into())),
        }
    }
}

/// Confirmation line for a committed balance change.
pub fn confirmation(event: &AccountEvent) -> String {
    match event.kind() {
        AccountEventKind::Deposited => format!("Successfully deposited ${}", event.amount()),
        AccountEventKind::Withdrawn => format!("Successfully withdrawn ${}", event.amount()),
    }
}

fn account_from_row(row: &StoreRow) -> Result<Account, StoreError> {
    Ok(Account::new(
        row.integer("id")?,
        row.text("account_number")?,
        row.text("name")?,
        row.text("pin")?,
        row.decimal("balance")?,
    ))
}
