use crate::error::{AppError, AppResult};
use crate::sql::statement::CrudStatement;
use crate::sql::value::CellValue;

/// Column names and every row of a read statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rows(QueryResult),
    Affected(usize),
}

impl Outcome {
    /// Unwrap a read result. A write outcome here means the statement kind
    /// and the executor disagree.
    pub fn into_rows(self) -> AppResult<QueryResult> {
        match self {
            Outcome::Rows(result) => Ok(result),
            Outcome::Affected(_) => Err(AppError::Execution("запрос не вернул строк".to_string())),
        }
    }

    pub fn into_affected(self) -> AppResult<usize> {
        match self {
            Outcome::Affected(n) => Ok(n),
            Outcome::Rows(_) => Err(AppError::Execution("ожидалось изменение данных".to_string())),
        }
    }
}

/// Runs one composed statement against the database.
pub trait Executor {
    /// Read statements return `Outcome::Rows`, write statements are committed
    /// and return `Outcome::Affected`.
    fn execute(&mut self, statement: &CrudStatement) -> AppResult<Outcome>;
}
