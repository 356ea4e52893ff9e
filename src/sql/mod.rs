pub mod statement;
pub mod value;
