use std::io;

use anyhow::{Context, Result};
use teller::{
    bin_utils::{Exit, Service},
    config::Config,
    gateway::sqlite_gateway::SqliteGateway,
    teller::{Teller, TellerError},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let gateway = SqliteGateway::open(&config.database).with_context(|| {
        format!(
            "Failed to open account store `{}`",
            config.database.display()
        )
    })?;

    let stdin = io::stdin();
    let service = Service {
        input: stdin.lock(),
        output: &mut io::stdout(),
        teller: Teller::new(gateway, config.max_pin_attempts),
        error_printer: Box::new(|err: &TellerError| eprintln!("{err}")),
    };

    match service.run()? {
        Exit::LockedOut => std::process::exit(1),
        Exit::Closed | Exit::InputClosed => Ok(()),
    }
}
