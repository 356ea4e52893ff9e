pub mod executor;
pub mod sqlite;

pub use executor::{Executor, Outcome, QueryResult};
pub use sqlite::SqliteExecutor;
