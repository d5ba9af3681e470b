use tracing::{info, warn};

use crate::account::Account;

use super::TellerError;

/// An account found by number whose PIN has not been confirmed yet.
/// The account is only released on a matching PIN.
#[derive(Debug)]
pub struct PinChallenge {
    account: Account,
    allowed: u8,
    remaining: u8,
}

#[derive(Debug)]
pub enum PinOutcome {
    Accepted(Account),
    Retry(PinChallenge),
}

impl PinChallenge {
    pub fn new(account: Account, attempts: u8) -> Self {
        let attempts = attempts.max(1);
        Self {
            account,
            allowed: attempts,
            remaining: attempts,
        }
    }

    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    pub fn account_number(&self) -> &str {
        self.account.account_number()
    }

    /// Running out of attempts is fatal for the whole session.
    pub fn attempt(mut self, pin: &str) -> Result<PinOutcome, TellerError> {
        if self.account.pin_matches(pin.trim()) {
            info!(account_number = self.account_number(), "login successful");
            return Ok(PinOutcome::Accepted(self.account));
        }

        self.remaining -= 1;
        warn!(
            account_number = self.account_number(),
            remaining = self.remaining,
            "incorrect PIN"
        );
        if self.remaining == 0 {
            Err(TellerError::AuthenticationExhausted {
                attempts: self.allowed,
            })
        } else {
            Ok(PinOutcome::Retry(self))
        }
    }
}
