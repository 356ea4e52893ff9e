#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tabledesk::error::{AppError, AppResult};
use tabledesk::execution::{Executor, Outcome, QueryResult};
use tabledesk::form::FormSession;
use tabledesk::sql::statement::{CrudStatement, StatementKind};
use tabledesk::sql::value::CellValue;
use tabledesk::ui::Surface;

/// Surface that remembers what would be on screen.
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub(crate) text: Option<String>,
    pub(crate) form: Option<FormSession>,
    pub(crate) forms_shown: usize,
    pub(crate) clears: usize,
    pub(crate) infos: Vec<String>,
    pub(crate) errors: Vec<String>,
}

impl Surface for RecordingSurface {
    fn show_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
    }

    fn show_form(&mut self, form: &FormSession) {
        assert!(self.form.is_none(), "previous form must be torn down first");
        self.form = Some(form.clone());
        self.forms_shown += 1;
    }

    fn clear_form(&mut self) {
        self.form = None;
        self.clears += 1;
    }

    fn show_info(&mut self, _title: &str, message: &str) {
        self.infos.push(message.to_string());
    }

    fn show_error(&mut self, _title: &str, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// In-memory stand-in for the database: answers metadata queries from
/// `tables`/`keys`, returns `rows` for every other read, and records every
/// statement it is handed.
#[derive(Debug, Default)]
pub(crate) struct ScriptedExecutor {
    pub(crate) tables: HashMap<String, Vec<String>>,
    pub(crate) keys: HashMap<String, Vec<String>>,
    pub(crate) rows: Vec<Vec<CellValue>>,
    pub(crate) affected: usize,
    pub(crate) executed: Vec<CrudStatement>,
}

impl ScriptedExecutor {
    pub(crate) fn with_table(mut self, table: &str, columns: &[&str]) -> Self {
        self.tables.insert(table.to_string(), columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub(crate) fn with_key(mut self, table: &str, key: &str) -> Self {
        self.keys.entry(table.to_string()).or_default().push(key.to_string());
        self
    }

    pub(crate) fn with_rows(mut self, rows: Vec<Vec<CellValue>>) -> Self {
        self.rows = rows;
        self
    }

    pub(crate) fn with_affected(mut self, affected: usize) -> Self {
        self.affected = affected;
        self
    }

    pub(crate) fn writes(&self) -> Vec<&CrudStatement> {
        self.executed.iter().filter(|s| s.kind() == StatementKind::Write).collect()
    }

    fn columns_of(&self, sql: &str) -> AppResult<Vec<String>> {
        let table = sql.split_whitespace().nth(3).unwrap_or_default();
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| AppError::Execution(format!("no such table: {}", table)))
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&mut self, statement: &CrudStatement) -> AppResult<Outcome> {
        self.executed.push(statement.clone());
        let sql = statement.sql();
        if statement.kind() == StatementKind::Write {
            return Ok(Outcome::Affected(self.affected));
        }
        if sql.contains("pragma_table_info") {
            let table = statement.params()[0].as_deref().unwrap_or_default();
            let keys = self.keys.get(table).cloned().unwrap_or_default();
            return Ok(Outcome::Rows(QueryResult {
                columns: vec!["name".to_string()],
                rows: keys.into_iter().map(|k| vec![CellValue::Text(k)]).collect(),
            }));
        }
        let columns = self.columns_of(sql)?;
        let rows = if sql.ends_with("WHERE 1=0") { Vec::new() } else { self.rows.clone() };
        Ok(Outcome::Rows(QueryResult { columns, rows }))
    }
}

/// Bound parameters as they would be typed, for comparing against
/// `CrudStatement::params`.
pub(crate) fn bound(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

pub(crate) fn tables(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub(crate) const STUDENT_SCHEMA: &str = "
    CREATE TABLE Факультет (Код INTEGER PRIMARY KEY, Название TEXT NOT NULL);
    CREATE TABLE Группа (Название TEXT PRIMARY KEY);
    CREATE TABLE Льгота (Название TEXT, Скидка INTEGER);
    CREATE TABLE Студент (
        Код INTEGER PRIMARY KEY,
        ФИО TEXT NOT NULL,
        Группа TEXT REFERENCES Группа(Название)
    );
";

/// Fresh SQLite file with the student schema in `dir`.
pub(crate) fn student_db(dir: &Path) -> PathBuf {
    let path = dir.join("students.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(STUDENT_SCHEMA).unwrap();
    path
}
