use std::path::{Path, PathBuf};

use log::{debug, warn};
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags};

use crate::error::{AppError, AppResult};
use crate::execution::executor::{Executor, Outcome, QueryResult};
use crate::sql::statement::{CrudStatement, StatementKind};
use crate::sql::value::CellValue;

/// Executor over a SQLite file. Holds only the path: a connection is opened
/// for each statement and closed again before `execute` returns.
pub struct SqliteExecutor {
    path: PathBuf,
}

impl SqliteExecutor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteExecutor { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The database must already exist; a missing file is a connection
    /// failure, not an empty database.
    fn open(&self) -> AppResult<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)
            .map_err(|e| AppError::Connection(format!("{}: {}", self.path.display(), e)))?;
        conn.execute_batch("PRAGMA foreign_keys = ON")
            .map_err(|e| AppError::Connection(e.to_string()))?;
        Ok(conn)
    }

    /// Acquire a connection, run `f`, release the connection whatever `f`
    /// returned.
    pub fn with_connection<T>(&self, f: impl FnOnce(&mut Connection) -> AppResult<T>) -> AppResult<T> {
        let mut conn = self.open()?;
        debug!("connection to {} opened", self.path.display());
        let result = f(&mut conn);
        if let Err((_, e)) = conn.close() {
            warn!("closing connection to {} failed: {}", self.path.display(), e);
        } else {
            debug!("connection to {} closed", self.path.display());
        }
        result
    }
}

fn cell_from_ref(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Null,
        ValueRef::Integer(i) => CellValue::Integer(i),
        ValueRef::Real(r) => CellValue::Real(r),
        ValueRef::Text(text) => CellValue::Text(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => CellValue::Blob(bytes.to_vec()),
    }
}

fn execution_error(e: rusqlite::Error) -> AppError {
    AppError::Execution(e.to_string())
}

fn run(conn: &mut Connection, statement: &CrudStatement) -> AppResult<Outcome> {
    let tx = conn.transaction().map_err(execution_error)?;
    let outcome = {
        let mut stmt = tx.prepare(statement.sql()).map_err(execution_error)?;
        match statement.kind() {
            StatementKind::Read => {
                let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
                let width = columns.len();
                let mut rows = stmt.query(params_from_iter(statement.params().iter())).map_err(execution_error)?;
                let mut collected = Vec::new();
                while let Some(row) = rows.next().map_err(execution_error)? {
                    let mut values = Vec::with_capacity(width);
                    for i in 0..width {
                        values.push(cell_from_ref(row.get_ref(i).map_err(execution_error)?));
                    }
                    collected.push(values);
                }
                Outcome::Rows(QueryResult { columns, rows: collected })
            }
            StatementKind::Write => {
                let affected = stmt.execute(params_from_iter(statement.params().iter())).map_err(execution_error)?;
                Outcome::Affected(affected)
            }
        }
    };
    // Dropping an uncommitted transaction rolls it back, so only the success
    // path reaches the commit.
    tx.commit().map_err(execution_error)?;
    Ok(outcome)
}

impl Executor for SqliteExecutor {
    fn execute(&mut self, statement: &CrudStatement) -> AppResult<Outcome> {
        debug!("execute: {} {:?}", statement.sql(), statement.params());
        self.with_connection(|conn| run(conn, statement))
    }
}
