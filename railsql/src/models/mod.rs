//! Domain models for the railsql conversion pipeline.
//!
//! - [`Line`] - A rail line declared by a header column
//! - [`Station`] - A station declared by a data row
//! - [`Membership`] - A station lying on a line
//! - [`Statement`] - One insert derived from the input
//! - [`RunSummary`] - Counts reported at the end of a run
//!
//! None of these outlive the statement they are rendered into.

use serde::{Deserialize, Serialize};

// =============================================================================
// Entities
// =============================================================================

/// A named rail line. The id is the header column index (first line column = 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: u64,
    pub name: String,
}

/// A named station. Ids are assigned sequentially in row order from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: u64,
    pub name: String,
}

/// A station lying on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub station_id: u64,
    pub line_id: u64,
}

// =============================================================================
// Statements
// =============================================================================

/// An abstract insert, rendered to SQL by [`crate::emit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Statement {
    LineInsert(Line),
    StationInsert(Station),
    MembershipInsert(Membership),
}

impl Statement {
    pub fn line(id: u64, name: impl Into<String>) -> Self {
        Statement::LineInsert(Line {
            id,
            name: name.into(),
        })
    }

    pub fn station(id: u64, name: impl Into<String>) -> Self {
        Statement::StationInsert(Station {
            id,
            name: name.into(),
        })
    }

    pub fn membership(station_id: u64, line_id: u64) -> Self {
        Statement::MembershipInsert(Membership {
            station_id,
            line_id,
        })
    }
}

// =============================================================================
// Run Summary
// =============================================================================

/// How many statements of each kind a run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub lines: u64,
    pub stations: u64,
    pub memberships: u64,
}

impl RunSummary {
    /// Count one more statement.
    pub fn record(&mut self, statement: &Statement) {
        match statement {
            Statement::LineInsert(_) => self.lines += 1,
            Statement::StationInsert(_) => self.stations += 1,
            Statement::MembershipInsert(_) => self.memberships += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.lines + self.stations + self.memberships
    }
}
