//! # railsql - transit network CSV to SQL
//!
//! railsql reads a CSV describing stations and the rail lines they are on
//! and writes a transactional SQL script that fills three tables:
//! `RailLine`, `Station` and a station/line membership table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV stdin  │────▶│   Parser    │────▶│   Engine    │────▶│  SQL stdout │
//! │  (header +  │     │ (csv crate) │     │ (ids, flags)│     │ BEGIN/COMMIT│
//! │   rows)     │     │             │     │             │     │ or ROLLBACK │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! Everything streams: one row is read, turned into statements and written
//! before the next row is read.
//!
//! ## Quick Start
//!
//! ```rust
//! use railsql::{convert, ConvertOptions};
//!
//! let csv = ",Red,Green,Blue\nFoo,0,f,false\nBar,1,F,True\n";
//! let mut sql = Vec::new();
//! convert(csv.as_bytes(), &mut sql, &ConvertOptions::default()).unwrap();
//!
//! let sql = String::from_utf8(sql).unwrap();
//! assert!(sql.starts_with("BEGIN;\n"));
//! assert!(sql.contains("INSERT INTO MembershipTable VALUES (2, 3);"));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types and failure classes
//! - [`models`] - Lines, stations, memberships and statements
//! - [`parser`] - Streaming CSV reader
//! - [`transform`] - Statement derivation and the conversion pipeline
//! - [`emit`] - SQL rendering and transaction framing
//! - [`logging`] - stderr diagnostics

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Output
pub mod emit;

// Diagnostics
pub mod logging;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ErrorKind,
    ReaderError,
    TransformError,
    SinkError,
    PipelineError,
    PipelineResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Line, Station, Membership, Statement, RunSummary};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{TabularReader, Records, Record, ReaderOptions};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    TransformEngine,
    parse_flag,
    convert,
    write_summary,
    ConvertOptions,
};

// =============================================================================
// Re-exports - SQL output
// =============================================================================

pub use emit::{ScriptEmitter, TableNames, escape_sql, render};
