//! The interactive text interface. It only talks to [`crate::teller`]; how
//! accounts are stored is never visible from here.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use console::{Console, PromptError};
use menu::{MAIN_MENU, MainChoice, SESSION_MENU, SessionChoice};

use crate::{
    account::Account,
    command::{OpenAccountCommand, TransactionAction, TransactionCommand},
    gateway::TransactionGateway,
    teller::{PinOutcome, Teller, TellerError, confirmation},
};

pub mod console;
pub mod menu;

/// How the program came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The operator chose to close the program.
    Closed,
    /// Input ran out.
    InputClosed,
    /// Too many wrong PINs. The store is not closed gracefully.
    LockedOut,
}

enum Login {
    Authenticated(Account),
    Cancelled,
    LockedOut,
}

pub struct Service<'w, R, W: 'w, G> {
    pub input: R,
    pub output: &'w mut W,
    pub teller: Teller<G>,
    /// Receives the details of failures the user only sees a summary of.
    pub error_printer: Box<dyn FnMut(&TellerError)>,
}

impl<'w, R, W, G> Service<'w, R, W, G>
where
    R: BufRead,
    W: Write + 'w,
    G: TransactionGateway,
{
    pub fn run(self) -> Result<Exit> {
        let mut atm = Atm {
            console: Console::new(self.input, self.output),
            teller: self.teller,
            error_printer: self.error_printer,
        };

        let exit = match atm.welcome() {
            Ok(exit) => exit,
            Err(PromptError::Closed) => Exit::InputClosed,
            Err(PromptError::Io(err)) => {
                return Err(err).context("Failed to read from or write to the terminal");
            }
        };

        if exit != Exit::LockedOut {
            atm.teller
                .into_gateway()
                .close()
                .context("Failed to close the account store")?;
        }
        Ok(exit)
    }
}

struct Atm<'w, R, W: 'w, G> {
    console: Console<'w, R, W>,
    teller: Teller<G>,
    error_printer: Box<dyn FnMut(&TellerError)>,
}

impl<'w, R, W, G> Atm<'w, R, W, G>
where
    R: BufRead,
    W: Write + 'w,
    G: TransactionGateway,
{
    fn welcome(&mut self) -> Result<Exit, PromptError> {
        self.console.say("Welcome to the ATM simulation program")?;
        loop {
            self.console.say("What would you like to do?")?;
            self.console.say(MAIN_MENU)?;
            let option = self.console.ask("Enter your option: ")?;
            match MainChoice::parse(&option) {
                Some(MainChoice::Exit) => {
                    self.console.say("Goodbye")?;
                    return Ok(Exit::Closed);
                }
                Some(MainChoice::Login) => match self.login()? {
                    Login::Authenticated(account) => self.session(account)?,
                    Login::Cancelled => {}
                    Login::LockedOut => return Ok(Exit::LockedOut),
                },
                Some(MainChoice::CreateAccount) => self.open_account()?,
                None => self.console.say("Please enter a number between 0 and 2")?,
            }
        }
    }

    fn login(&mut self) -> Result<Login, PromptError> {
        loop {
            let number = self
                .console
                .ask("Enter your account number (or type 'exit' to quit): ")?;
            if number.trim() == "exit" {
                self.console.say("Exiting...")?;
                return Ok(Login::Cancelled);
            }

            let account = match self.teller.find_account(&number) {
                Ok(Some(account)) => account,
                Ok(None) => {
                    self.console.say("No account found.")?;
                    continue;
                }
                Err(err) => {
                    self.report_failure(err, "An error occurred. Please try again later.")?;
                    return Ok(Login::Cancelled);
                }
            };
            self.console.say("Account found.")?;

            let mut challenge = self.teller.challenge(account);
            loop {
                let pin = self.console.ask("Enter your pin number: ")?;
                match challenge.attempt(&pin) {
                    Ok(PinOutcome::Accepted(account)) => {
                        self.console.say("Login successful")?;
                        return Ok(Login::Authenticated(account));
                    }
                    Ok(PinOutcome::Retry(next)) => {
                        self.console.say(format_args!(
                            "Incorrect PIN, {} attempts remaining",
                            next.remaining()
                        ))?;
                        challenge = next;
                    }
                    Err(_) => {
                        self.console.say("Incorrect PIN, your card is now locked")?;
                        return Ok(Login::LockedOut);
                    }
                }
            }
        }
    }

    fn open_account(&mut self) -> Result<(), PromptError> {
        let name = self.console.ask("Enter account holder's name: ")?;
        let pin = self
            .console
            .ask_until("Enter a 4-digit pin: ", OpenAccountCommand::parse_pin)?;
        let initial_deposit = self.console.ask_until(
            "Enter your initial deposit: ",
            OpenAccountCommand::parse_initial_deposit,
        )?;

        let command = OpenAccountCommand {
            name: name.trim().to_string(),
            pin,
            initial_deposit,
        };
        match self.teller.open_account(command) {
            Ok(account) => self.console.say(format_args!(
                "New account successfully created, your account number is: {}",
                account.account_number()
            )),
            Err(err @ TellerError::StoreErr(_)) => {
                self.report_failure(err, "An error occurred. Your account was not created.")
            }
            Err(err) => {
                let message = err.to_string();
                self.report_failure(err, &message)
            }
        }
    }

    fn session(&mut self, mut account: Account) -> Result<(), PromptError> {
        loop {
            self.console.say(SESSION_MENU)?;
            let option = self.console.ask("Enter your option: ")?;
            match SessionChoice::parse(&option) {
                Some(SessionChoice::LogOut) => {
                    self.console.say("Session is closed")?;
                    return Ok(());
                }
                Some(SessionChoice::Deposit) => self.transact(
                    &mut account,
                    TransactionAction::Deposit,
                    "Enter an amount to be deposited: ",
                )?,
                Some(SessionChoice::Withdraw) => self.transact(
                    &mut account,
                    TransactionAction::Withdraw,
                    "Enter an amount to be withdrawn: ",
                )?,
                Some(SessionChoice::ViewBalance) => self.console.say(account.check_balance())?,
                Some(SessionChoice::DeleteAccount) => match self.delete_account(account)? {
                    Some(kept) => account = kept,
                    None => return Ok(()),
                },
                None => self.console.say("Please enter a number between 0 and 4")?,
            }
        }
    }

    fn transact(
        &mut self,
        account: &mut Account,
        action: TransactionAction,
        prompt: &str,
    ) -> Result<(), PromptError> {
        let answer = self.console.ask(prompt)?;
        let command = match TransactionCommand::parse(action, &answer) {
            Ok(command) => command,
            Err(err) => return self.console.say(format_args!("Invalid input: {err}")),
        };

        match self.teller.transact(account, command) {
            Ok(event) => self.console.say(confirmation(&event)),
            Err(err) if err.is_recoverable_input() => {
                self.console.say(format_args!("Invalid input: {err}"))
            }
            Err(err) => {
                self.report_failure(err, "An error occurred. Your balance was not changed.")
            }
        }
    }

    /// Gives the account back unless it was deleted.
    fn delete_account(&mut self, account: Account) -> Result<Option<Account>, PromptError> {
        if let Err(err) = account.ensure_closable() {
            self.console.say(err)?;
            return Ok(Some(account));
        }

        let answer = self
            .console
            .ask("Are you sure you want to delete your account? (Y/N) ")?;
        if answer.trim() != "Y" {
            self.console.say("Your account was not deleted")?;
            return Ok(Some(account));
        }

        match self.teller.close_account(account) {
            Ok(()) => {
                self.console.say("Your account is successfully deleted")?;
                Ok(None)
            }
            Err((account, err)) => {
                self.report_failure(err, "An error occurred. Your account was not deleted.")?;
                Ok(Some(account))
            }
        }
    }

    fn report_failure(&mut self, err: TellerError, message: &str) -> Result<(), PromptError> {
        (self.error_printer)(&err);
        self.console.say(message)
    }
}
