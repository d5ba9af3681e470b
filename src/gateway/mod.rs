use std::str::FromStr;

use rusqlite::types::Value;
use rust_decimal::Decimal;
use thiserror::Error;

pub mod sqlite_gateway;
pub mod statement;

pub use statement::{Fetch, Statement};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("Column `{column}` is missing from the result row")]
    MissingColumn { column: String },
    #[error("Column `{column}` holds an unexpected value: {value}")]
    UnexpectedValue { column: String, value: String },
    #[error("Expected {expected} from the store, got {actual}")]
    UnexpectedOutcome {
        expected: &'static str,
        actual: &'static str,
    },
}

/// What a committed write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub rows_affected: usize,
    /// Set only for key generating statements that inserted exactly one row.
    pub generated_id: Option<i64>,
}

/// Every gateway invocation ends in exactly one of these.
#[derive(Debug)]
pub enum TxOutcome {
    /// Fetch mode [`Fetch::One`]; `None` when nothing matched.
    Fetched(Option<StoreRow>),
    /// Fetch mode [`Fetch::None`].
    Done(WriteSummary),
    /// The unit of work was rolled back.
    Failed(StoreError),
}

impl TxOutcome {
    pub fn is_committed(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Only a fetch yields a row; a write summary is an error here.
    pub fn into_row(self) -> Result<Option<StoreRow>, StoreError> {
        match self {
            Self::Fetched(row) => Ok(row),
            Self::Done(_) => Err(StoreError::UnexpectedOutcome {
                expected: "a fetched row",
                actual: "a write summary",
            }),
            Self::Failed(err) => Err(err),
        }
    }

    pub fn into_summary(self) -> Result<WriteSummary, StoreError> {
        match self {
            Self::Fetched(_) => Err(StoreError::UnexpectedOutcome {
                expected: "a write summary",
                actual: "a fetched row",
            }),
            Self::Done(summary) => Ok(summary),
            Self::Failed(err) => Err(err),
        }
    }
}

/// Executes one statement as one unit of work: commit on success, rollback on
/// any failure. Nothing is retried.
pub trait TransactionGateway {
    /// `on_commit` runs only after the commit succeeded. It cannot influence
    /// what was committed.
    fn execute_with<F>(&mut self, statement: Statement, on_commit: F) -> TxOutcome
    where
        F: FnOnce(&TxOutcome);

    fn execute(&mut self, statement: Statement) -> TxOutcome {
        self.execute_with(statement, |_| {})
    }

    /// Releases the underlying store handle.
    fn close(self) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// One fetched row, detached from the connection it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRow {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl StoreRow {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    fn value(&self, column: &str) -> Result<&Value, StoreError> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|idx| self.values.get(idx))
            .ok_or_else(|| StoreError::MissingColumn {
                column: column.to_string(),
            })
    }

    fn unexpected(column: &str, value: &Value) -> StoreError {
        StoreError::UnexpectedValue {
            column: column.to_string(),
            value: format!("{value:?}"),
        }
    }

    pub fn integer(&self, column: &str) -> Result<i64, StoreError> {
        match self.value(column)? {
            Value::Integer(value) => Ok(*value),
            other => Err(Self::unexpected(column, other)),
        }
    }

    /// Integers are rendered as text, so numeric columns can be read as identifiers.
    pub fn text(&self, column: &str) -> Result<String, StoreError> {
        match self.value(column)? {
            Value::Text(value) => Ok(value.clone()),
            Value::Integer(value) => Ok(value.to_string()),
            other => Err(Self::unexpected(column, other)),
        }
    }

    pub fn decimal(&self, column: &str) -> Result<Decimal, StoreError> {
        match self.value(column)? {
            text @ Value::Text(value) => {
                Decimal::from_str(value).map_err(|_| Self::unexpected(column, text))
            }
            Value::Integer(value) => Ok(Decimal::from(*value)),
            other => Err(Self::unexpected(column, other)),
        }
    }
}
