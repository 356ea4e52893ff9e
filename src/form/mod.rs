//! Input forms generated from live column metadata.
//!
//! A form is a list of (label, input) pairs, one per column, plus the action
//! its submit control triggers. Nothing here is table specific: every table
//! goes through the same [`build_form`].

use crate::error::{AppError, AppResult};
use crate::sql::value::{CellValue, FieldValue, Param};

/// What submitting the form does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    Insert,
    /// Look up the row whose key the form holds and open it for editing.
    LoadForUpdate { key_column: String },
    Update { key_column: String, key_value: FieldValue },
    Delete { key_column: String },
}

impl SubmitAction {
    pub fn label(&self) -> &'static str {
        match self {
            SubmitAction::Insert => "Добавить",
            SubmitAction::LoadForUpdate { .. } => "Загрузить данные",
            SubmitAction::Update { .. } => "Обновить",
            SubmitAction::Delete { .. } => "Удалить",
        }
    }
}

/// One labeled input. `value` is `None` until something is typed into it, or
/// when it was pre-filled from a NULL cell; either way it binds as NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub column: String,
    pub label: String,
    pub value: Option<FieldValue>,
}

impl FormField {
    /// What the input shows: NULL is an empty box.
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }
}

/// Column → value pairs in form order, as captured at submit time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    entries: Vec<(String, Param)>,
}

impl RecordDraft {
    pub fn columns(&self) -> Vec<String> {
        self.entries.iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn values(&self) -> Vec<Param> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries.iter().find(|(c, _)| c == column).and_then(|(_, v)| v.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The one form currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSession {
    table: String,
    fields: Vec<FormField>,
    action: SubmitAction,
}

impl FormSession {
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn action(&self) -> &SubmitAction {
        &self.action
    }

    pub fn submit_label(&self) -> &'static str {
        self.action.label()
    }

    /// Replace the text of the input bound to `column`.
    pub fn set(&mut self, column: &str, value: impl Into<FieldValue>) -> AppResult<()> {
        match self.fields.iter_mut().find(|f| f.column == column) {
            Some(field) => {
                field.value = Some(value.into());
                Ok(())
            }
            None => Err(AppError::Validation(format!("в форме нет поля {}", column))),
        }
    }

    pub fn draft(&self) -> RecordDraft {
        RecordDraft {
            entries: self.fields.iter().map(|f| (f.column.clone(), f.value.clone())).collect(),
        }
    }
}

fn field(column: &str, label: String, value: Option<FieldValue>) -> FormField {
    FormField { column: column.to_string(), label, value }
}

/// One labeled input per column, pre-filled from `prefill` when editing an
/// existing row. Inputs left untouched bind NULL. An empty column list is a schema problem upstream and fails
/// instead of producing a form with nothing but a submit control.
pub fn build_form(
    table: &str,
    columns: &[String],
    prefill: Option<&[CellValue]>,
    action: SubmitAction,
) -> AppResult<FormSession> {
    if columns.is_empty() {
        return Err(AppError::Schema(format!("таблица {} не содержит столбцов", table)));
    }
    if let Some(values) = prefill {
        if values.len() != columns.len() {
            return Err(AppError::Schema(format!(
                "строка содержит {} значений, а таблица {} столбцов",
                values.len(),
                columns.len()
            )));
        }
    }

    let fields = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let value = prefill.and_then(|values| values[i].to_field_value());
            field(column, column.clone(), value)
        })
        .collect();

    Ok(FormSession { table: table.to_string(), fields, action })
}

/// Single-field form asking for the key of the row to update or delete.
pub fn key_form(table: &str, action: SubmitAction) -> AppResult<FormSession> {
    let (key_column, label) = match &action {
        SubmitAction::LoadForUpdate { key_column } => {
            (key_column.clone(), format!("Введите {} для изменения:", key_column))
        }
        SubmitAction::Delete { key_column } => (key_column.clone(), format!("Введите {} для удаления", key_column)),
        other => {
            return Err(AppError::Validation(format!(
                "действие «{}» не запрашивает ключ",
                other.label()
            )))
        }
    };
    Ok(FormSession {
        table: table.to_string(),
        fields: vec![field(&key_column, label, None)],
        action,
    })
}
