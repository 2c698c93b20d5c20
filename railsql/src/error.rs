//! Error types for the railsql conversion pipeline.
//!
//! Every failure falls into one of four classes, reported by `kind()`:
//!
//! - [`ReaderError`] - CSV syntax and shape errors ([`ErrorKind::MalformedInput`])
//! - [`TransformError`] - schema and flag value errors
//!   ([`ErrorKind::SchemaError`], [`ErrorKind::ValueError`])
//! - [`SinkError`] - failures writing the script ([`ErrorKind::SinkWriteError`])
//! - [`PipelineError`] - top-level outcome of a failed run
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::fmt;
use thiserror::Error;

/// Coarse failure class used for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Tabular syntax violation or inconsistent row width.
    MalformedInput,
    /// Structural violation: no line columns, empty line or station name.
    SchemaError,
    /// A flag column holds something other than a boolean literal.
    ValueError,
    /// The output channel rejected a write or flush.
    SinkWriteError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedInput => "MalformedInput",
            ErrorKind::SchemaError => "SchemaError",
            ErrorKind::ValueError => "ValueError",
            ErrorKind::SinkWriteError => "SinkWriteError",
        };
        f.write_str(name)
    }
}

// =============================================================================
// CSV Reader Errors
// =============================================================================

/// Errors while decoding the CSV input.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The input had no header row at all.
    #[error("input is empty, expected a header row")]
    MissingHeader,

    /// `header()` was called a second time.
    #[error("header row has already been read")]
    HeaderAlreadyRead,

    /// Quoting or encoding violation reported by the CSV decoder.
    #[error("line {line}: {message}")]
    Syntax { line: u64, message: String },

    /// A row does not have as many fields as the header.
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Failed to read from the input stream.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

impl ReaderError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::MalformedInput
    }
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors raised while deriving statements from the CSV rows.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The CSV itself could not be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(#[from] ReaderError),

    /// Header declares no line columns.
    #[error("no rail lines: the header needs at least one line column")]
    NoRailLines,

    /// A line column has an empty label.
    #[error("empty line name in header column {column}")]
    EmptyLineName { column: usize },

    /// A data row has an empty station name.
    #[error("empty station name for station {station_id} (line {line})")]
    EmptyStationName { station_id: u64, line: u64 },

    /// A flag is not one of the accepted boolean literals.
    #[error("invalid boolean {value:?} for station '{station}', line '{line}'")]
    InvalidBoolean {
        station: String,
        line: String,
        value: String,
    },
}

impl TransformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransformError::MalformedInput(e) => e.kind(),
            TransformError::NoRailLines
            | TransformError::EmptyLineName { .. }
            | TransformError::EmptyStationName { .. } => ErrorKind::SchemaError,
            TransformError::InvalidBoolean { .. } => ErrorKind::ValueError,
        }
    }
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors writing the SQL script.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing or flushing failed while emitting `stage`.
    #[error("failed to write {stage}: {source}")]
    Write {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl SinkError {
    pub fn write(stage: &'static str, source: std::io::Error) -> Self {
        SinkError::Write { stage, source }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::SinkWriteError
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Outcome of a run that ended in `ROLLBACK;`.
///
/// This is the error type returned by [`crate::transform::pipeline::convert`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading or transforming the input failed.
    #[error("transform failed: {0}")]
    TransformFailed(#[from] TransformError),

    /// The output channel failed.
    #[error("transform failed: {0}")]
    SinkWrite(#[from] SinkError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::TransformFailed(e) => e.kind(),
            PipelineError::SinkWrite(e) => e.kind(),
        }
    }
}

impl From<ReaderError> for PipelineError {
    fn from(err: ReaderError) -> Self {
        PipelineError::TransformFailed(err.into())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV reading.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Result type for statement derivation.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for script output.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for a full conversion run.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ReaderError -> TransformError -> PipelineError
        let reader_err = ReaderError::FieldCount {
            line: 3,
            expected: 4,
            found: 2,
        };
        let pipeline_err: PipelineError = reader_err.into();
        assert_eq!(pipeline_err.kind(), ErrorKind::MalformedInput);
        assert!(pipeline_err.to_string().contains("line 3"));

        let transform_err = TransformError::EmptyLineName { column: 2 };
        let pipeline_err: PipelineError = transform_err.into();
        assert_eq!(pipeline_err.kind(), ErrorKind::SchemaError);
        assert!(pipeline_err.to_string().starts_with("transform failed"));
    }

    #[test]
    fn test_invalid_boolean_names_station_and_line() {
        let err = TransformError::InvalidBoolean {
            station: "Bar".into(),
            line: "Green".into(),
            value: "maybe".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid boolean"));
        assert!(msg.contains("Bar"));
        assert!(msg.contains("Green"));
        assert!(msg.contains("maybe"));
        assert_eq!(err.kind(), ErrorKind::ValueError);
    }

    #[test]
    fn test_sink_error_kind_and_stage() {
        let err = SinkError::write(
            "COMMIT",
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"),
        );
        assert_eq!(err.kind(), ErrorKind::SinkWriteError);
        assert!(err.to_string().contains("COMMIT"));

        let pipeline_err: PipelineError = err.into();
        assert_eq!(pipeline_err.kind(), ErrorKind::SinkWriteError);
    }

    #[test]
    fn test_schema_messages() {
        assert!(TransformError::NoRailLines.to_string().contains("no rail lines"));
        assert!(TransformError::EmptyLineName { column: 1 }
            .to_string()
            .contains("empty line name"));
        assert!(TransformError::EmptyStationName {
            station_id: 4,
            line: 5
        }
        .to_string()
        .contains("empty station name"));
    }
}
