//! Statement derivation.
//!
//! [`TransformEngine`] turns the header into `LineInsert`s, each row into a
//! `StationInsert` followed by one `MembershipInsert` per truthy flag, and
//! yields them lazily. Nothing is buffered beyond the current row.

use std::io::Read;
use tracing::debug;

use super::flags::parse_flag;
use crate::error::{TransformError, TransformResult};
use crate::models::{RunSummary, Statement};
use crate::parser::{Record, Records, TabularReader};

enum Phase {
    /// Emitting line inserts; `column` is the next header column.
    Lines { column: usize },
    /// Waiting for the next data row.
    Rows,
    /// Emitting memberships of the current row; `column` is the next flag.
    Memberships {
        station_id: u64,
        record: Record,
        column: usize,
    },
    Done,
}

/// Lazy statement stream over one CSV input.
///
/// Yields `Ok(statement)` until the input is exhausted. The first `Err`
/// ends the stream; later calls to `next()` return `None`.
pub struct TransformEngine<R: Read> {
    header: Vec<String>,
    records: Records<R>,
    phase: Phase,
    next_station_id: u64,
    summary: RunSummary,
}

impl<R: Read> TransformEngine<R> {
    /// Read and check the header. Fails if it declares no line columns.
    pub fn new(mut reader: TabularReader<R>) -> TransformResult<Self> {
        let header = reader.header()?;
        if header.len() < 2 {
            return Err(TransformError::NoRailLines);
        }
        debug!("header declares {} rail lines", header.len() - 1);

        Ok(Self {
            header,
            records: reader.records(),
            phase: Phase::Lines { column: 1 },
            next_station_id: 1,
            summary: RunSummary::default(),
        })
    }

    /// Line names in id order (index 0 is line 1).
    pub fn line_names(&self) -> &[String] {
        &self.header[1..]
    }

    /// Counts of statements yielded so far.
    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    fn yielded(&mut self, statement: Statement) -> Option<TransformResult<Statement>> {
        self.summary.record(&statement);
        Some(Ok(statement))
    }
}

impl<R: Read> Iterator for TransformEngine<R> {
    type Item = TransformResult<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Any early return below leaves the phase at Done.
            match std::mem::replace(&mut self.phase, Phase::Done) {
                Phase::Done => return None,

                Phase::Lines { column } => {
                    let Some(name) = self.header.get(column) else {
                        self.phase = Phase::Rows;
                        continue;
                    };
                    if name.is_empty() {
                        return Some(Err(TransformError::EmptyLineName { column }));
                    }
                    let statement = Statement::line(column as u64, name.clone());
                    self.phase = Phase::Lines { column: column + 1 };
                    return self.yielded(statement);
                }

                Phase::Rows => {
                    let record = match self.records.next() {
                        None => {
                            debug!("input exhausted after {} stations", self.next_station_id - 1);
                            return None;
                        }
                        Some(Err(e)) => return Some(Err(e.into())),
                        Some(Ok(record)) => record,
                    };

                    let station_id = self.next_station_id;
                    let name = record.fields.first().cloned().unwrap_or_default();
                    if name.is_empty() {
                        return Some(Err(TransformError::EmptyStationName {
                            station_id,
                            line: record.line,
                        }));
                    }

                    self.phase = Phase::Memberships {
                        station_id,
                        record,
                        column: 1,
                    };
                    return self.yielded(Statement::station(station_id, name));
                }

                Phase::Memberships {
                    station_id,
                    record,
                    column,
                } => {
                    let flag = record.fields.get(column).map(|v| parse_flag(v));
                    match flag {
                        None => {
                            // Row fully processed.
                            self.next_station_id += 1;
                            self.phase = Phase::Rows;
                        }
                        Some(None) => {
                            return Some(Err(TransformError::InvalidBoolean {
                                station: record.fields[0].clone(),
                                line: self.header[column].clone(),
                                value: record.fields[column].clone(),
                            }));
                        }
                        Some(Some(on_line)) => {
                            self.phase = Phase::Memberships {
                                station_id,
                                record,
                                column: column + 1,
                            };
                            if on_line {
                                return self
                                    .yielded(Statement::membership(station_id, column as u64));
                            }
                        }
                    }
                }
            }
        }
    }
}
