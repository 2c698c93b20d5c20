//! SQL text for statements.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::models::Statement;

/// Names of the three target tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableNames {
    pub rail_line: String,
    pub station: String,
    pub membership: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            rail_line: "RailLine".to_string(),
            station: "Station".to_string(),
            membership: "MembershipTable".to_string(),
        }
    }
}

/// Make `value` safe to place between single quotes.
///
/// Strips NUL and doubles `'`. Nothing else is touched, so backslashes
/// and the like are left for the caller to deal with on databases that
/// treat them specially.
pub fn escape_sql(value: &str) -> Cow<'_, str> {
    if !value.contains(['\0', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 2);
    for c in value.chars() {
        match c {
            '\0' => {}
            '\'' => escaped.push_str("''"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Render one statement, without the trailing newline.
pub fn render(statement: &Statement, tables: &TableNames) -> String {
    match statement {
        Statement::LineInsert(line) => format!(
            "INSERT INTO {} VALUES ({}, '{}');",
            tables.rail_line,
            line.id,
            escape_sql(&line.name)
        ),
        Statement::StationInsert(station) => format!(
            "INSERT INTO {} VALUES ({}, '{}');",
            tables.station,
            station.id,
            escape_sql(&station.name)
        ),
        Statement::MembershipInsert(m) => format!(
            "INSERT INTO {} VALUES ({}, {});",
            tables.membership, m.station_id, m.line_id
        ),
    }
}
