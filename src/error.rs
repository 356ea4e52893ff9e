use thiserror::Error;
use std::io;

/// Failures of a single user-triggered action. None of them is fatal: the
/// session turns each one into an error dialog and returns to idle.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("не удалось подключиться к базе данных: {0}")]
    Connection(String),
    #[error("ошибка при получении структуры таблицы: {0}")]
    Schema(String),
    #[error("{0}")]
    Validation(String),
    #[error("ошибка при выполнении запроса: {0}")]
    Execution(String),
    #[error("ошибка конфигурации: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// Short kind name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Connection(_) => "connection",
            AppError::Schema(_) => "schema",
            AppError::Validation(_) => "validation",
            AppError::Execution(_) => "execution",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
