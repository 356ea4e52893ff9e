use crate::error::{AppError, AppResult};
use crate::sql::value::Param;

/// Write operation a form submission turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

/// Whether the executor should hand back rows or an affected-row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Write,
}

/// SQL text with positional `?` placeholders plus the values bound to them,
/// in placeholder order. Values never appear in the text itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CrudStatement {
    kind: StatementKind,
    sql: String,
    params: Vec<Param>,
    placeholders: usize,
}

impl CrudStatement {
    fn read(sql: String, params: Vec<Param>, placeholders: usize) -> Self {
        CrudStatement { kind: StatementKind::Read, sql, params, placeholders }
    }

    fn write(sql: String, params: Vec<Param>, placeholders: usize) -> Self {
        CrudStatement { kind: StatementKind::Write, sql, params, placeholders }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Number of `?` placeholders emitted while composing. Identifiers are
    /// interpolated verbatim and may contain `?` themselves, so this is not
    /// recounted from the text.
    pub fn placeholder_count(&self) -> usize {
        self.placeholders
    }
}

pub const MISSING_KEY_MESSAGE: &str = "Введите значение первичного ключа.";

fn require_key<'a>(key_column: Option<&'a str>, key_value: Option<&'a str>) -> AppResult<(&'a str, &'a str)> {
    let value = match key_value {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Err(AppError::Validation(MISSING_KEY_MESSAGE.to_string())),
    };
    let column = match key_column {
        Some(c) if !c.is_empty() => c,
        _ => return Err(AppError::Validation("не задан ключевой столбец".to_string())),
    };
    Ok((column, value))
}

fn require_columns(columns: &[String], values: &[Param]) -> AppResult<()> {
    if columns.is_empty() {
        return Err(AppError::Validation("нет столбцов для записи".to_string()));
    }
    if columns.len() != values.len() {
        return Err(AppError::Validation(format!(
            "ожидалось значений: {}, получено: {}",
            columns.len(),
            values.len()
        )));
    }
    Ok(())
}

/// Build the parameterized statement for one form submission.
///
/// Table and column names are interpolated verbatim: they come from schema
/// introspection, never from user text. Every check runs before anything
/// touches the database.
pub fn compose(
    table: &str,
    operation: Operation,
    columns: &[String],
    values: &[Param],
    key_column: Option<&str>,
    key_value: Option<&str>,
) -> AppResult<CrudStatement> {
    match operation {
        Operation::Insert => {
            require_columns(columns, values)?;
            let placeholders = vec!["?"; columns.len()].join(", ");
            let sql = format!("INSERT INTO {} ({}) VALUES ({})", table, columns.join(", "), placeholders);
            Ok(CrudStatement::write(sql, values.to_vec(), columns.len()))
        }
        Operation::Update => {
            let (key_column, key_value) = require_key(key_column, key_value)?;
            require_columns(columns, values)?;
            let assignments = columns
                .iter()
                .map(|c| format!("{} = ?", c))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, assignments, key_column);
            let mut params = values.to_vec();
            params.push(Some(key_value.to_string()));
            Ok(CrudStatement::write(sql, params, columns.len() + 1))
        }
        Operation::Delete => {
            let (key_column, key_value) = require_key(key_column, key_value)?;
            let sql = format!("DELETE FROM {} WHERE {} = ?", table, key_column);
            Ok(CrudStatement::write(sql, vec![Some(key_value.to_string())], 1))
        }
    }
}

pub fn select_all(table: &str) -> CrudStatement {
    CrudStatement::read(format!("SELECT * FROM {}", table), Vec::new(), 0)
}

/// Returns no rows but full column metadata.
pub fn structure_only(table: &str) -> CrudStatement {
    CrudStatement::read(format!("SELECT * FROM {} WHERE 1=0", table), Vec::new(), 0)
}

pub fn select_by_key(table: &str, key_column: &str, key_value: &str) -> AppResult<CrudStatement> {
    let (key_column, key_value) = require_key(Some(key_column), Some(key_value))?;
    Ok(CrudStatement::read(
        format!("SELECT * FROM {} WHERE {} = ?", table, key_column),
        vec![Some(key_value.to_string())],
        1,
    ))
}

/// Primary-key column names of `table`, in key order. The table name is bound,
/// not interpolated.
pub fn primary_key_columns(table: &str) -> CrudStatement {
    CrudStatement::read(
        "SELECT name FROM pragma_table_info(?) WHERE pk > 0 ORDER BY pk".to_string(),
        vec![Some(table.to_string())],
        1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn vals(values: &[&str]) -> Vec<Param> {
        values.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn insert_binds_values_in_column_order() {
        let columns = cols(&["Код", "Название", "Факультет"]);
        let values = vals(&["1", "ИТ-21", "3"]);
        let stmt = compose("Группа", Operation::Insert, &columns, &values, None, None).unwrap();
        assert_eq!(stmt.sql(), "INSERT INTO Группа (Код, Название, Факультет) VALUES (?, ?, ?)");
        assert_eq!(stmt.params(), values.as_slice());
        assert_eq!(stmt.placeholder_count(), columns.len());
        assert_eq!(stmt.kind(), StatementKind::Write);
    }

    #[test]
    fn insert_placeholder_count_tracks_columns() {
        for n in 1..=6 {
            let columns: Vec<String> = (0..n).map(|i| format!("c{}", i)).collect();
            let values: Vec<Param> = (0..n).map(|i| Some(format!("v{}", i))).collect();
            let stmt = compose("t", Operation::Insert, &columns, &values, None, None).unwrap();
            assert_eq!(stmt.placeholder_count(), n);
            assert_eq!(stmt.params(), values.as_slice());
        }
    }

    #[test]
    fn insert_requires_columns() {
        let err = compose("t", Operation::Insert, &[], &[], None, None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn insert_rejects_length_mismatch() {
        let err = compose("t", Operation::Insert, &cols(&["a", "b"]), &vals(&["1"]), None, None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn update_appends_key_value() {
        let columns = cols(&["id", "name"]);
        let values = vals(&["5", "Иванов"]);
        let stmt = compose("Студент", Operation::Update, &columns, &values, Some("id"), Some("4")).unwrap();
        assert_eq!(stmt.sql(), "UPDATE Студент SET id = ?, name = ? WHERE id = ?");
        assert_eq!(stmt.params(), vals(&["5", "Иванов", "4"]).as_slice());
        assert_eq!(stmt.placeholder_count(), stmt.params().len());
    }

    #[test]
    fn update_without_key_value_is_rejected() {
        let columns = cols(&["id"]);
        let values = vals(&["1"]);
        for key in [None, Some(""), Some("   ")] {
            let err = compose("t", Operation::Update, &columns, &values, Some("id"), key).unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m == MISSING_KEY_MESSAGE));
        }
    }

    #[test]
    fn update_without_key_column_is_rejected() {
        let err = compose("t", Operation::Update, &cols(&["a"]), &vals(&["1"]), None, Some("1")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn delete_binds_only_key() {
        let stmt = compose("Льгота", Operation::Delete, &[], &[], Some("Код"), Some("9")).unwrap();
        assert_eq!(stmt.sql(), "DELETE FROM Льгота WHERE Код = ?");
        assert_eq!(stmt.params(), vals(&["9"]).as_slice());
    }

    #[test]
    fn delete_with_empty_key_is_rejected() {
        let err = compose("Льгота", Operation::Delete, &[], &[], Some("Код"), Some("")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn values_stay_out_of_sql_text() {
        let hostile = vals(&["'; DROP TABLE Студент; --"]);
        let stmt = compose("Студент", Operation::Insert, &cols(&["name"]), &hostile, None, None).unwrap();
        assert!(!stmt.sql().contains("DROP"));
        assert_eq!(stmt.params(), hostile.as_slice());
    }

    #[test]
    fn read_statements() {
        assert_eq!(select_all("Факультет").sql(), "SELECT * FROM Факультет");
        assert_eq!(structure_only("Факультет").sql(), "SELECT * FROM Факультет WHERE 1=0");
        let lookup = select_by_key("Факультет", "Код", "2").unwrap();
        assert_eq!(lookup.sql(), "SELECT * FROM Факультет WHERE Код = ?");
        assert_eq!(lookup.kind(), StatementKind::Read);
        assert!(select_by_key("Факультет", "Код", "").is_err());
        assert_eq!(primary_key_columns("Факультет").params(), vals(&["Факультет"]).as_slice());
    }

    #[test]
    fn null_values_bind_as_none() {
        let values = vec![Some("Сирота".to_string()), None];
        let columns = cols(&["Название", "Скидка"]);
        let stmt = compose("Льгота", Operation::Update, &columns, &values, Some("Название"), Some("Сирота")).unwrap();
        assert_eq!(stmt.params(), &[Some("Сирота".to_string()), None, Some("Сирота".to_string())]);
    }

    #[test]
    fn question_mark_in_identifier_does_not_count_as_placeholder() {
        let stmt = compose("t", Operation::Insert, &cols(&["\"why?\""]), &vals(&["x"]), None, None).unwrap();
        assert_eq!(stmt.sql().matches('?').count(), 2);
        assert_eq!(stmt.placeholder_count(), 1);
        let stmt = compose("t", Operation::Update, &cols(&["\"a?\"", "b"]), &vals(&["1", "2"]), Some("id"), Some("3")).unwrap();
        assert_eq!(stmt.placeholder_count(), stmt.params().len());
    }
}
