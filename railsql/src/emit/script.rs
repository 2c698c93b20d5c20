//! Transaction-wrapped script writer.

use std::io::{BufWriter, Write};
use tracing::warn;

use super::sql::{render, TableNames};
use crate::error::{SinkError, SinkResult};
use crate::models::Statement;

/// Writes `BEGIN;`, one line per statement, then `COMMIT;` or `ROLLBACK;`.
///
/// Owns the buffered sink for the whole run. Dropping the emitter flushes
/// whatever is still buffered, so output reaches the sink on every exit path.
pub struct ScriptEmitter<W: Write> {
    out: BufWriter<W>,
    tables: TableNames,
    committed: bool,
}

impl<W: Write> ScriptEmitter<W> {
    pub fn new(output: W, tables: TableNames) -> Self {
        Self {
            out: BufWriter::new(output),
            tables,
            committed: false,
        }
    }

    pub fn begin(&mut self) -> SinkResult<()> {
        self.write_line("BEGIN;", "BEGIN")
    }

    /// Render and write one statement immediately.
    pub fn emit(&mut self, statement: &Statement) -> SinkResult<()> {
        let sql = render(statement, &self.tables);
        self.write_line(&sql, "statement")
    }

    /// Close the transaction. Statements are flushed before `COMMIT;` is written.
    ///
    /// If only the final flush fails, `COMMIT;` may already be in the sink and
    /// a later [`rollback`](Self::rollback) will not append `ROLLBACK;` after it.
    pub fn commit(&mut self) -> SinkResult<()> {
        self.out
            .flush()
            .map_err(|e| SinkError::write("statement", e))?;
        self.write_line("COMMIT;", "COMMIT")?;
        self.committed = true;
        self.out.flush().map_err(|e| SinkError::write("COMMIT", e))
    }

    /// Abort the transaction. Best effort: failures are logged, never raised.
    pub fn rollback(&mut self) {
        if self.committed {
            warn!("'COMMIT;' already written, not appending 'ROLLBACK;'");
        } else if let Err(e) = writeln!(self.out, "ROLLBACK;") {
            warn!("failed to write 'ROLLBACK;': {}", e);
        }
        if let Err(e) = self.out.flush() {
            warn!("failed to flush script output: {}", e);
        }
    }

    fn write_line(&mut self, line: &str, stage: &'static str) -> SinkResult<()> {
        writeln!(self.out, "{}", line).map_err(|e| SinkError::write(stage, e))
    }
}

impl<W: Write> Drop for ScriptEmitter<W> {
    fn drop(&mut self) {
        if let Err(e) = self.out.flush() {
            warn!("failed to flush script output: {}", e);
        }
    }
}
