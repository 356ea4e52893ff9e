use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{debug, info};
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, space0};
use nom::combinator::rest;
use nom::sequence::{delimited, separated_pair};
use nom::{IResult, Parser};

use crate::error::{AppError, AppResult};

pub const DATABASE_FILE: &str = "tabledesk.db";
pub const CONFIG_FILE: &str = "tabledesk.conf";

lazy_static! {
    /// Tables offered by the selector when no configuration overrides them.
    pub static ref DEFAULT_TABLES: Vec<String> = [
        "Студент",
        "Льгота",
        "Группа",
        "Факультет",
        "РодственникСтудента",
        "ВидыРодственников",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: PathBuf,
    pub tables: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config { database: PathBuf::from(DATABASE_FILE), tables: DEFAULT_TABLES.clone() }
    }
}

fn entry(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        delimited(space0, char('='), space0),
        rest,
    )
    .parse(input)
}

impl Config {
    /// Apply `key = value` lines on top of the defaults. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn parse(text: &str) -> AppResult<Config> {
        let mut config = Config::default();
        for (n, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (_, (key, value)) =
                entry(line).map_err(|_| AppError::Config(format!("строка {}: ожидалось ключ = значение", n + 1)))?;
            let value = value.trim();
            match key {
                "database" => {
                    if value.is_empty() {
                        return Err(AppError::Config(format!("строка {}: пустой путь к базе данных", n + 1)));
                    }
                    config.database = PathBuf::from(value);
                }
                "tables" => {
                    let tables: Vec<String> = value
                        .split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect();
                    if tables.is_empty() {
                        return Err(AppError::Config(format!("строка {}: список таблиц пуст", n + 1)));
                    }
                    config.tables = tables;
                }
                other => return Err(AppError::Config(format!("строка {}: неизвестный ключ {}", n + 1, other))),
            }
        }
        Ok(config)
    }

    /// Read `path` if it exists, otherwise fall back to the defaults.
    pub fn load(path: &Path) -> AppResult<Config> {
        if !path.exists() {
            debug!("no {} found, using defaults", path.display());
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)?;
        let config = Config::parse(&text)?;
        info!("configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load [`CONFIG_FILE`] from the working directory; the first positional
    /// argument, if any, replaces the database path.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> AppResult<Config> {
        let mut config = Config::load(Path::new(CONFIG_FILE))?;
        if let Some(database) = args.next() {
            config.database = PathBuf::from(database);
        }
        if let Some(extra) = args.next() {
            return Err(AppError::Config(format!("лишний аргумент: {}", extra)));
        }
        Ok(config)
    }
}
