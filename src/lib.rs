pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod execution;
pub mod form;
pub mod output;
pub mod sql;
pub mod ui;
