use log::{debug, info, warn};

use crate::catalog;
use crate::error::{AppError, AppResult};
use crate::execution::executor::Executor;
use crate::form::{build_form, key_form, FormSession, SubmitAction};
use crate::output::render;
use crate::sql::statement::{compose, select_all, select_by_key, Operation};
use crate::ui::{Surface, TableRef};

pub const ERROR_TITLE: &str = "Ошибка";
pub const INFO_TITLE: &str = "Успех";

/// Progress of the update flow. Add and delete never leave `Idle` for longer
/// than one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle,
    KeyRequested,
    RowLoaded,
    Submitting,
}

/// One interactive session: the selected table, at most one open form, and
/// the database and surface it talks to.
///
/// Every public action catches its own failure, reports it as an error
/// dialog, and leaves the session idle with no form on screen. The one
/// exception is naming a column the open form does not have: that is a typo
/// at the prompt, so the form and its draft stay up.
pub struct Engine<E: Executor, S: Surface> {
    executor: E,
    surface: S,
    tables: Vec<String>,
    selected: usize,
    form: Option<FormSession>,
    state: UpdateState,
}

impl<E: Executor, S: Surface> Engine<E, S> {
    pub fn new(executor: E, surface: S, tables: Vec<String>) -> AppResult<Self> {
        if tables.is_empty() {
            return Err(AppError::Config("список таблиц пуст".to_string()));
        }
        Ok(Engine { executor, surface, tables, selected: 0, form: None, state: UpdateState::Idle })
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn selected_table(&self) -> &str {
        &self.tables[self.selected]
    }

    pub fn form(&self) -> Option<&FormSession> {
        self.form.as_ref()
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Pick the table later actions work on. The open form belongs to the
    /// previous table and is discarded.
    pub fn select_table(&mut self, table: &TableRef) {
        let result = self.resolve(table).map(|i| {
            self.teardown_form();
            self.selected = i;
            info!("table selected: {}", self.tables[i]);
        });
        self.finish(result);
    }

    /// Dump every row of the selected table into the output area.
    pub fn show_data(&mut self) {
        let result = self.try_show_data();
        self.finish(result);
    }

    pub fn begin_add(&mut self) {
        let result = self.try_begin_add();
        self.finish(result);
    }

    pub fn begin_update(&mut self) {
        let result = self.try_begin_keyed(|key_column| SubmitAction::LoadForUpdate { key_column });
        if result.is_ok() {
            self.state = UpdateState::KeyRequested;
        }
        self.finish(result);
    }

    pub fn begin_delete(&mut self) {
        let result = self.try_begin_keyed(|key_column| SubmitAction::Delete { key_column });
        self.finish(result);
    }

    /// Edit one input of the open form.
    pub fn set_field(&mut self, column: &str, value: &str) {
        let result = match self.form.as_mut() {
            Some(form) => form.set(column, value),
            None => Err(AppError::Validation("нет открытой формы".to_string())),
        };
        if let Err(e) = result {
            self.report(&e);
        }
    }

    /// Trigger the open form's submit control.
    pub fn submit(&mut self) {
        let result = self.try_submit();
        self.finish(result);
    }

    /// Discard the open form and its draft.
    pub fn cancel(&mut self) {
        self.teardown_form();
    }

    fn resolve(&self, table: &TableRef) -> AppResult<usize> {
        let found = match table {
            TableRef::Index(i) if *i >= 1 && *i <= self.tables.len() => Some(i - 1),
            TableRef::Index(_) => None,
            TableRef::Name(name) => self.tables.iter().position(|t| t == name),
        };
        found.ok_or_else(|| {
            let shown = match table {
                TableRef::Index(i) => i.to_string(),
                TableRef::Name(name) => name.clone(),
            };
            AppError::Validation(format!("таблица {} не входит в список", shown))
        })
    }

    fn finish(&mut self, result: AppResult<()>) {
        if let Err(e) = result {
            self.teardown_form();
            self.report(&e);
        }
    }

    fn report(&mut self, e: &AppError) {
        warn!("{} error: {}", e.kind(), e);
        self.surface.show_error(ERROR_TITLE, &e.to_string());
    }

    fn teardown_form(&mut self) {
        if self.form.take().is_some() {
            self.surface.clear_form();
        }
        self.state = UpdateState::Idle;
    }

    fn open_form(&mut self, form: FormSession) {
        self.surface.show_form(&form);
        self.form = Some(form);
    }

    fn try_show_data(&mut self) -> AppResult<()> {
        let table = self.selected_table().to_string();
        let result = self.executor.execute(&select_all(&table))?.into_rows()?;
        debug!("{}: {} rows", table, result.rows.len());
        self.surface.show_text(&render(&result.columns, &result.rows));
        Ok(())
    }

    fn try_begin_add(&mut self) -> AppResult<()> {
        self.teardown_form();
        let table = self.selected_table().to_string();
        let schema = catalog::introspect(&mut self.executor, &table)?;
        let form = build_form(&table, &schema.column_names(), None, SubmitAction::Insert)?;
        self.open_form(form);
        Ok(())
    }

    fn try_begin_keyed(&mut self, action: impl FnOnce(String) -> SubmitAction) -> AppResult<()> {
        self.teardown_form();
        let table = self.selected_table().to_string();
        let schema = catalog::introspect(&mut self.executor, &table)?;
        let form = key_form(&table, action(schema.key_column().to_string()))?;
        self.open_form(form);
        Ok(())
    }

    fn try_submit(&mut self) -> AppResult<()> {
        let form = self
            .form
            .clone()
            .ok_or_else(|| AppError::Validation("нет открытой формы".to_string()))?;
        let table = form.table().to_string();
        let draft = form.draft();

        match form.action().clone() {
            SubmitAction::Insert => {
                let stmt = compose(&table, Operation::Insert, &draft.columns(), &draft.values(), None, None)?;
                let affected = self.executor.execute(&stmt)?.into_affected()?;
                info!("inserted {} row(s) into {}", affected, table);
                self.teardown_form();
                self.surface.show_info(INFO_TITLE, "Данные успешно добавлены!");
            }
            SubmitAction::LoadForUpdate { key_column } => {
                let key_value = draft.get(&key_column).unwrap_or_default().to_string();
                let stmt = select_by_key(&table, &key_column, &key_value)?;
                let mut result = self.executor.execute(&stmt)?.into_rows()?;
                let row = match result.rows.len() {
                    1 => result.rows.remove(0),
                    0 => return Err(not_found(&key_value)),
                    n => {
                        return Err(AppError::Execution(format!(
                            "ключ {} = {} соответствует {} записям",
                            key_column, key_value, n
                        )))
                    }
                };
                let form = build_form(
                    &table,
                    &result.columns,
                    Some(row.as_slice()),
                    SubmitAction::Update { key_column, key_value },
                )?;
                self.teardown_form();
                self.open_form(form);
                self.state = UpdateState::RowLoaded;
            }
            SubmitAction::Update { key_column, key_value } => {
                self.state = UpdateState::Submitting;
                let stmt = compose(
                    &table,
                    Operation::Update,
                    &draft.columns(),
                    &draft.values(),
                    Some(&key_column),
                    Some(&key_value),
                )?;
                let affected = self.executor.execute(&stmt)?.into_affected()?;
                if affected == 0 {
                    return Err(not_found(&key_value));
                }
                info!("updated {} row(s) in {} where {} = {}", affected, table, key_column, key_value);
                self.teardown_form();
                self.surface.show_info(INFO_TITLE, "Данные успешно обновлены!");
            }
            SubmitAction::Delete { key_column } => {
                let key_value = draft.get(&key_column).unwrap_or_default().to_string();
                let stmt = compose(&table, Operation::Delete, &[], &[], Some(&key_column), Some(&key_value))?;
                let affected = self.executor.execute(&stmt)?.into_affected()?;
                if affected == 0 {
                    return Err(not_found(&key_value));
                }
                info!("deleted {} row(s) from {} where {} = {}", affected, table, key_column, key_value);
                self.teardown_form();
                self.surface.show_info(INFO_TITLE, "Запись успешно удалена!");
            }
        }
        Ok(())
    }
}

fn not_found(key_value: &str) -> AppError {
    AppError::Execution(format!("Запись с первичным ключом {} не найдена.", key_value))
}
