//! SQL script output.
//!
//! - SQL: Statement rendering and string literal escaping
//! - Script: `BEGIN;` / `COMMIT;` / `ROLLBACK;` framing over a buffered sink

pub mod script;
pub mod sql;

pub use script::ScriptEmitter;
pub use sql::{escape_sql, render, TableNames};
