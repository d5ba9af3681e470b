use std::path::Path;

use rusqlite::{Connection, Transaction, params_from_iter, types::Value};
use tracing::{debug, error, warn};

use super::{Fetch, Statement, StoreError, StoreRow, TransactionGateway, TxOutcome, WriteSummary};

/// Public account numbers are handed out by the store itself. AUTOINCREMENT
/// keeps ids, and so numbers, from being reissued after a delete.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    account_number TEXT UNIQUE,
    name TEXT NOT NULL,
    pin TEXT NOT NULL,
    balance TEXT NOT NULL CHECK (CAST(balance AS REAL) >= 0)
);

CREATE TRIGGER IF NOT EXISTS assign_account_number
AFTER INSERT ON accounts
WHEN NEW.account_number IS NULL
BEGIN
    UPDATE accounts SET account_number = printf('%d', 10000000 + NEW.id) WHERE id = NEW.id;
END;
";

/// Owns the one connection used for the whole program run.
pub struct SqliteGateway {
    conn: Connection,
}

impl SqliteGateway {
    /// Opens (or creates) the database at `path`. `:memory:` gives a private
    /// in-memory database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening account store");
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn run(tx: &Transaction<'_>, statement: &Statement) -> Result<TxOutcome, StoreError> {
        let params = params_from_iter(statement.params().iter());
        let outcome = match statement.fetch() {
            Fetch::One => {
                let mut stmt = tx.prepare(statement.sql())?;
                let columns: Vec<String> = stmt
                    .column_names()
                    .into_iter()
                    .map(String::from)
                    .collect();
                let mut rows = stmt.query(params)?;
                let row = match rows.next()? {
                    Some(row) => {
                        let values = (0..columns.len())
                            .map(|idx| row.get::<_, Value>(idx))
                            .collect::<Result<Vec<_>, _>>()?;
                        Some(StoreRow::new(columns, values))
                    }
                    None => None,
                };
                TxOutcome::Fetched(row)
            }
            Fetch::None => {
                let rows_affected = tx.execute(statement.sql(), params)?;
                let generated_id = (statement.generates_key() && rows_affected == 1)
                    .then(|| tx.last_insert_rowid());
                TxOutcome::Done(WriteSummary {
                    rows_affected,
                    generated_id,
                })
            }
        };
        Ok(outcome)
    }

    fn fail(sql: &str, err: StoreError) -> TxOutcome {
        error!(sql, %err, "statement failed, unit of work rolled back");
        TxOutcome::Failed(err)
    }
}

impl TransactionGateway for SqliteGateway {
    fn execute_with<F>(&mut self, statement: Statement, on_commit: F) -> TxOutcome
    where
        F: FnOnce(&TxOutcome),
    {
        debug!(sql = statement.sql(), "executing statement");
        let tx = match self.conn.transaction() {
            Ok(tx) => tx,
            Err(err) => return Self::fail(statement.sql(), err.into()),
        };

        match Self::run(&tx, &statement) {
            Ok(outcome) => {
                // a failed commit leaves nothing applied
                if let Err(err) = tx.commit() {
                    return Self::fail(statement.sql(), err.into());
                }
                on_commit(&outcome);
                outcome
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(%rollback_err, "rollback failed");
                }
                Self::fail(statement.sql(), err)
            }
        }
    }

    fn close(self) -> Result<(), StoreError> {
        debug!("closing account store");
        self.conn.close().map_err(|(_, err)| StoreError::from(err))
    }
}
