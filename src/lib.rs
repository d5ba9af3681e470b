/// One bank account and the rules for changing its balance.
/// Knows nothing about persistence.
pub mod account;

/// Operator input turned into typed commands for [`account`] and [`teller`].
pub mod command;

/// Runs single statements against the account store as atomic units of work,
/// plus the SQLite implementation.
pub mod gateway;

/// Account creation, login, balance changes and deletion, each persisted
/// through a [`gateway::TransactionGateway`].
pub mod teller;

/// Store location and login policy, read from `.env` and the environment.
pub mod config;

/// Menu driven terminal interface. Lives in the library so integration tests
/// can drive it with scripted input.
pub mod bin_utils;
