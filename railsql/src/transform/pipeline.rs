//! High-level conversion API: CSV in, transactional SQL script out.
//!
//! [`convert`] wires the reader, the engine and the emitter together and is
//! the one place that turns a failure into `ROLLBACK;`.
//!
//! # Example
//!
//! ```rust
//! use railsql::{convert, ConvertOptions};
//!
//! let csv = ",Red,Green\nFoo,1,0\n";
//! let mut script = Vec::new();
//! let summary = convert(csv.as_bytes(), &mut script, &ConvertOptions::default()).unwrap();
//!
//! assert_eq!(summary.lines, 2);
//! assert!(String::from_utf8(script).unwrap().ends_with("COMMIT;\n"));
//! ```

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, error, info};

use super::engine::TransformEngine;
use crate::emit::{ScriptEmitter, TableNames};
use crate::error::PipelineResult;
use crate::models::RunSummary;
use crate::parser::{ReaderOptions, TabularReader};

/// Options for a conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// How the CSV input is decoded.
    pub reader: ReaderOptions,

    /// Target table names.
    pub tables: TableNames,
}

/// Convert `input` into a SQL script written to `output`.
///
/// On success the script ends with `COMMIT;`. On any failure, including a
/// failing `output`, `ROLLBACK;` is written (best effort, and never after a
/// `COMMIT;` that already reached the buffer), the output is flushed and the
/// cause is returned.
pub fn convert<R: Read, W: Write>(
    input: R,
    output: W,
    options: &ConvertOptions,
) -> PipelineResult<RunSummary> {
    let mut emitter = ScriptEmitter::new(output, options.tables.clone());

    match stream(input, &mut emitter, options) {
        Ok(summary) => {
            info!(
                "committed {} rail lines, {} stations, {} memberships",
                summary.lines, summary.stations, summary.memberships
            );
            Ok(summary)
        }
        Err(e) => {
            error!("{} ({})", e, e.kind());
            emitter.rollback();
            Err(e)
        }
    }
}

fn stream<R: Read, W: Write>(
    input: R,
    emitter: &mut ScriptEmitter<W>,
    options: &ConvertOptions,
) -> PipelineResult<RunSummary> {
    emitter.begin()?;

    let mut engine = TransformEngine::new(TabularReader::new(input, &options.reader))?;
    debug!("rail lines: {}", engine.line_names().join(", "));

    for statement in &mut engine {
        emitter.emit(&statement?)?;
    }

    emitter.commit()?;
    Ok(engine.summary())
}

/// Save a run summary as pretty-printed JSON.
pub fn write_summary(path: &Path, summary: &RunSummary) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    debug!("summary written to {}", path.display());
    Ok(())
}
