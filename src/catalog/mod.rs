use log::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::execution::executor::Executor;
use crate::sql::statement::{primary_key_columns, structure_only};
use crate::sql::value::CellValue;

/// One column of a table as reported by the database, in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub primary_key: bool,
}

/// Live column metadata of one table plus the column used to address a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
    key: usize,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn key_column(&self) -> &str {
        &self.columns[self.key].name
    }

    /// True when the key comes from real primary-key metadata rather than the
    /// first-column convention.
    pub fn key_is_declared(&self) -> bool {
        self.columns[self.key].primary_key
    }
}

fn schema_error(e: AppError) -> AppError {
    match e {
        AppError::Execution(msg) => AppError::Schema(msg),
        other => other,
    }
}

/// Ordered columns of `table`, read from a structure-only query. Never cached:
/// every call goes to the database.
pub fn columns(executor: &mut dyn Executor, table: &str) -> AppResult<Vec<ColumnDescriptor>> {
    let names = executor
        .execute(&structure_only(table))
        .and_then(|outcome| outcome.into_rows())
        .map_err(schema_error)?
        .columns;

    let declared: Vec<String> = executor
        .execute(&primary_key_columns(table))
        .and_then(|outcome| outcome.into_rows())
        .map_err(schema_error)?
        .rows
        .into_iter()
        .filter_map(|row| match row.into_iter().next() {
            Some(CellValue::Text(name)) => Some(name),
            _ => None,
        })
        .collect();
    debug!("table {}: columns {:?}, primary key {:?}", table, names, declared);

    // A composite key cannot address a row through a single column.
    let sole_key = if declared.len() == 1 { declared.first() } else { None };
    Ok(names
        .into_iter()
        .map(|name| {
            let primary_key = sole_key.is_some_and(|k| *k == name);
            ColumnDescriptor { name, primary_key }
        })
        .collect())
}

/// Columns of `table` plus its key column: the sole declared primary-key
/// column when there is one, otherwise the first column.
pub fn introspect(executor: &mut dyn Executor, table: &str) -> AppResult<TableSchema> {
    let columns = columns(executor, table)?;
    if columns.is_empty() {
        return Err(AppError::Schema(format!("таблица {} не содержит столбцов", table)));
    }
    let key = match columns.iter().position(|c| c.primary_key) {
        Some(i) => i,
        None => {
            warn!(
                "table {} has no single-column primary key; using first column '{}' as key",
                table, columns[0].name
            );
            0
        }
    };
    Ok(TableSchema { table: table.to_string(), columns, key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::executor::{Outcome, QueryResult};
    use crate::sql::statement::CrudStatement;

    struct Fixed {
        columns: Vec<&'static str>,
        keys: Vec<&'static str>,
        fail: Option<AppError>,
    }

    impl Executor for Fixed {
        fn execute(&mut self, statement: &CrudStatement) -> AppResult<Outcome> {
            if let Some(e) = self.fail.take() {
                return Err(e);
            }
            if statement.sql().contains("pragma_table_info") {
                return Ok(Outcome::Rows(QueryResult {
                    columns: vec!["name".into()],
                    rows: self.keys.iter().map(|k| vec![CellValue::from(*k)]).collect(),
                }));
            }
            Ok(Outcome::Rows(QueryResult {
                columns: self.columns.iter().map(|c| c.to_string()).collect(),
                rows: Vec::new(),
            }))
        }
    }

    #[test]
    fn declared_key_wins_over_position() {
        let mut exec = Fixed { columns: vec!["Название", "Код"], keys: vec!["Код"], fail: None };
        let schema = introspect(&mut exec, "Факультет").unwrap();
        assert_eq!(schema.column_names(), vec!["Название", "Код"]);
        assert_eq!(schema.key_column(), "Код");
        assert!(schema.key_is_declared());
    }

    #[test]
    fn falls_back_to_first_column() {
        let mut exec = Fixed { columns: vec!["a", "b"], keys: vec![], fail: None };
        let schema = introspect(&mut exec, "t").unwrap();
        assert_eq!(schema.key_column(), "a");
        assert!(!schema.key_is_declared());
    }

    #[test]
    fn composite_key_falls_back_to_first_column() {
        let mut exec = Fixed { columns: vec!["a", "b", "c"], keys: vec!["b", "c"], fail: None };
        let schema = introspect(&mut exec, "t").unwrap();
        assert_eq!(schema.key_column(), "a");
        assert!(schema.columns.iter().all(|c| !c.primary_key));
    }

    #[test]
    fn execution_failure_becomes_schema_error() {
        let mut exec = Fixed {
            columns: vec![],
            keys: vec![],
            fail: Some(AppError::Execution("no such table: x".into())),
        };
        assert!(matches!(introspect(&mut exec, "x"), Err(AppError::Schema(_))));
    }

    #[test]
    fn connection_failure_stays_connection_error() {
        let mut exec = Fixed { columns: vec![], keys: vec![], fail: Some(AppError::Connection("down".into())) };
        assert!(matches!(columns(&mut exec, "x"), Err(AppError::Connection(_))));
    }

    #[test]
    fn empty_schema_is_an_error() {
        let mut exec = Fixed { columns: vec![], keys: vec![], fail: None };
        assert!(matches!(introspect(&mut exec, "t"), Err(AppError::Schema(_))));
    }
}
