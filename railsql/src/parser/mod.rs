//! Streaming CSV reader for station/line tables.
//!
//! Wraps `csv::Reader` so the header is read exactly once and data rows
//! are pulled lazily, one [`Record`] at a time. Quoting follows RFC 4180
//! (double quotes, embedded delimiters and newlines allowed inside quotes).
//!
//! The `csv` decoder is lenient about stray quotes, so the raw bytes of every
//! record are kept alongside it and checked strictly: an unterminated quoted
//! field, a `"` inside an unquoted field, or text after a closing quote is a
//! [`ReaderError::Syntax`].

use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::io::{self, BufRead, BufReader, Read};
use std::rc::Rc;

use crate::error::{ReaderError, ReaderResult};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// CSV decoding options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderOptions {
    /// Field delimiter (default: `b','`).
    pub delimiter: u8,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// One data row with the input line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number in the input.
    pub line: u64,
    pub fields: Vec<String>,
}

/// Bytes pulled from the input that no checked record has covered yet.
type Seen = Rc<RefCell<Vec<u8>>>;

/// Input wrapper recording every byte handed to the decoder.
struct Tap<R: Read> {
    inner: BufReader<R>,
    seen: Seen,
    started: bool,
}

impl<R: Read> Read for Tap<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.started {
            self.started = true;
            // Dropped here so decoder offsets and recorded bytes line up.
            if self.inner.fill_buf()?.starts_with(UTF8_BOM) {
                self.inner.consume(UTF8_BOM.len());
            }
        }
        let n = self.inner.read(buf)?;
        self.seen.borrow_mut().extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

/// Strict quoting check over the raw bytes of each decoded record.
struct QuoteCheck {
    seen: Seen,
    /// Input offset of `seen[0]`.
    base: u64,
    delimiter: u8,
}

impl QuoteCheck {
    /// Check input bytes `start..end` and forget everything before `end`.
    fn check(&mut self, start: u64, end: u64, line: u64) -> ReaderResult<()> {
        let mut seen = self.seen.borrow_mut();
        let from = (start.saturating_sub(self.base) as usize).min(seen.len());
        let to = (end.saturating_sub(self.base) as usize).min(seen.len());

        let result = validate_quotes(&seen[from..to], self.delimiter).map_err(|message| {
            ReaderError::Syntax {
                line,
                message: message.to_string(),
            }
        });

        seen.drain(..to);
        self.base += to as u64;
        result
    }
}

enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    /// A `"` inside a quoted field: either an escaped quote or the closing one.
    QuoteInQuoted,
}

/// Validate RFC 4180 quoting of one raw record (terminator included).
fn validate_quotes(raw: &[u8], delimiter: u8) -> Result<(), &'static str> {
    let mut state = QuoteState::FieldStart;

    for &b in raw {
        let separator = b == delimiter || b == b'\n' || b == b'\r';
        state = match state {
            QuoteState::FieldStart if b == b'"' => QuoteState::Quoted,
            QuoteState::FieldStart if separator => QuoteState::FieldStart,
            QuoteState::FieldStart => QuoteState::Unquoted,

            QuoteState::Unquoted if b == b'"' => return Err("bare \" in unquoted field"),
            QuoteState::Unquoted if separator => QuoteState::FieldStart,
            QuoteState::Unquoted => QuoteState::Unquoted,

            QuoteState::Quoted if b == b'"' => QuoteState::QuoteInQuoted,
            QuoteState::Quoted => QuoteState::Quoted,

            QuoteState::QuoteInQuoted if b == b'"' => QuoteState::Quoted,
            QuoteState::QuoteInQuoted if separator => QuoteState::FieldStart,
            QuoteState::QuoteInQuoted => return Err("extraneous text after closing \""),
        };
    }

    match state {
        QuoteState::Quoted => Err("unterminated quoted field"),
        _ => Ok(()),
    }
}

/// CSV source bound to any `Read`.
pub struct TabularReader<R: Read> {
    inner: csv::Reader<Tap<R>>,
    quotes: QuoteCheck,
    header_width: Option<usize>,
}

impl<R: Read> TabularReader<R> {
    pub fn new(input: R, options: &ReaderOptions) -> Self {
        let seen = Seen::default();
        let tap = Tap {
            inner: BufReader::new(input),
            seen: Rc::clone(&seen),
            started: false,
        };
        let inner = ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .delimiter(options.delimiter)
            .from_reader(tap);
        Self {
            inner,
            quotes: QuoteCheck {
                seen,
                base: 0,
                delimiter: options.delimiter,
            },
            header_width: None,
        }
    }

    /// Read the header row. Can only be called once.
    pub fn header(&mut self) -> ReaderResult<Vec<String>> {
        if self.header_width.is_some() {
            return Err(ReaderError::HeaderAlreadyRead);
        }

        let mut record = StringRecord::new();
        let found = self.inner.read_record(&mut record).map_err(map_csv_error)?;
        if !found {
            return Err(ReaderError::MissingHeader);
        }
        let (start, line) = record_start(&record, &self.inner);
        self.quotes.check(start, self.inner.position().byte(), line)?;

        let header: Vec<String> = record.iter().map(str::to_string).collect();
        self.header_width = Some(header.len());
        Ok(header)
    }

    /// Consume the reader and stream the remaining rows.
    pub fn records(self) -> Records<R> {
        Records {
            inner: self.inner,
            quotes: self.quotes,
            expected: self.header_width,
            record: StringRecord::new(),
            done: false,
        }
    }
}

/// Lazy, single-pass iterator over data rows.
///
/// Stops after the first error.
pub struct Records<R: Read> {
    inner: csv::Reader<Tap<R>>,
    quotes: QuoteCheck,
    expected: Option<usize>,
    record: StringRecord,
    done: bool,
}

impl<R: Read> Records<R> {
    fn read_next(&mut self) -> ReaderResult<Option<Record>> {
        if !self.inner.read_record(&mut self.record).map_err(map_csv_error)? {
            return Ok(None);
        }

        let (start, line) = record_start(&self.record, &self.inner);
        self.quotes.check(start, self.inner.position().byte(), line)?;

        if let Some(expected) = self.expected {
            if self.record.len() != expected {
                return Err(ReaderError::FieldCount {
                    line,
                    expected,
                    found: self.record.len(),
                });
            }
        }

        Ok(Some(Record {
            line,
            fields: self.record.iter().map(str::to_string).collect(),
        }))
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = ReaderResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = self.read_next();
        if !matches!(next, Ok(Some(_))) {
            self.done = true;
        }
        next.transpose()
    }
}

/// Byte offset and line where `record` began.
fn record_start<R: Read>(record: &StringRecord, reader: &csv::Reader<R>) -> (u64, u64) {
    match record.position() {
        Some(p) => (p.byte(), p.line()),
        None => (reader.position().byte(), reader.position().line()),
    }
}

fn map_csv_error(err: csv::Error) -> ReaderError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(e) => ReaderError::Io(e),
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => ReaderError::FieldCount {
            line: pos.map(|p| p.line()).unwrap_or(line),
            expected: expected_len as usize,
            found: len as usize,
        },
        csv::ErrorKind::Utf8 { pos, err } => ReaderError::Syntax {
            line: pos.map(|p| p.line()).unwrap_or(line),
            message: format!("invalid UTF-8 in field {}", err.field() + 1),
        },
        other => ReaderError::Syntax {
            line,
            message: format!("{:?}", other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(csv: &str) -> TabularReader<&[u8]> {
        TabularReader::new(csv.as_bytes(), &ReaderOptions::default())
    }

    #[test]
    fn test_header_then_records() {
        let mut r = reader(",Red,Green\nFoo,1,0\nBar,0,1\n");
        assert_eq!(r.header().unwrap(), vec!["", "Red", "Green"]);

        let rows: Vec<Record> = r.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields, vec!["Foo", "1", "0"]);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].fields, vec!["Bar", "0", "1"]);
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn test_quoted_fields_keep_delimiters_and_quotes() {
        let mut r = reader("Station,\"Red, North\"\n\"O\"\"Brien\",true\n");
        assert_eq!(r.header().unwrap(), vec!["Station", "Red, North"]);

        let rows: Vec<Record> = r.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].fields, vec!["O\"Brien", "true"]);
    }

    #[test]
    fn test_embedded_newline_in_quotes() {
        let mut r = reader(",Red\n\"Two\nLines\",1\n");
        r.header().unwrap();
        let rows: Vec<Record> = r.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].fields[0], "Two\nLines");
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let mut r = reader("");
        assert!(matches!(r.header(), Err(ReaderError::MissingHeader)));
    }

    #[test]
    fn test_header_is_read_once() {
        let mut r = reader(",Red\nFoo,1\n");
        r.header().unwrap();
        assert!(matches!(r.header(), Err(ReaderError::HeaderAlreadyRead)));
    }

    #[test]
    fn test_short_row_is_malformed() {
        let mut r = reader(",Red,Green\nFoo,1\n");
        r.header().unwrap();
        let mut rows = r.records();
        match rows.next() {
            Some(Err(ReaderError::FieldCount {
                expected, found, ..
            })) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected field count error, got {:?}", other),
        }
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_long_row_is_malformed() {
        let mut r = reader(",Red\nFoo,1,0\n");
        r.header().unwrap();
        let first = r.records().next().unwrap();
        assert!(matches!(first, Err(ReaderError::FieldCount { found: 3, .. })));
    }

    #[test]
    fn test_invalid_utf8_is_syntax_error() {
        let bytes: &[u8] = b",Red\nSoci\xe9t\xe9,1\n";
        let mut r = TabularReader::new(bytes, &ReaderOptions::default());
        r.header().unwrap();
        let first = r.records().next().unwrap();
        assert!(matches!(first, Err(ReaderError::Syntax { .. })));
    }

    #[test]
    fn test_custom_delimiter() {
        let options = ReaderOptions { delimiter: b';' };
        let mut r = TabularReader::new(";Red;Blue\nFoo;1;0\n".as_bytes(), &options);
        assert_eq!(r.header().unwrap(), vec!["", "Red", "Blue"]);
        let rows: Vec<Record> = r.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].fields, vec!["Foo", "1", "0"]);
    }

    fn first_row_error(csv: &str) -> ReaderError {
        let mut r = reader(csv);
        r.header().unwrap();
        let mut rows = r.records();
        let err = match rows.next() {
            Some(Err(e)) => e,
            other => panic!("expected a reader error, got {:?}", other),
        };
        assert!(rows.next().is_none());
        err
    }

    #[test]
    fn test_unterminated_quote_is_syntax_error() {
        match first_row_error(",Red\nFoo,\"1") {
            ReaderError::Syntax { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("unterminated"), "{}", message);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_quote_in_unquoted_field_is_syntax_error() {
        match first_row_error(",Red\nFo\"o,1\n") {
            ReaderError::Syntax { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("unquoted"), "{}", message);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_text_after_closing_quote_is_syntax_error() {
        match first_row_error(",Red\n\"Foo\"x,1\n") {
            ReaderError::Syntax { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("closing"), "{}", message);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_quoting_in_header_is_syntax_error() {
        let mut r = reader(",\"Red\nFoo,1\n");
        assert!(matches!(r.header(), Err(ReaderError::Syntax { line: 1, .. })));
    }

    #[test]
    fn test_quote_check_follows_later_records() {
        let mut r = reader(",Red\n\"A\",1\r\n\"B\"\"\",0\r\nC,\"1\"\"\n");
        r.header().unwrap();
        let results: Vec<ReaderResult<Record>> = r.records().collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().fields, vec!["A", "1"]);
        assert_eq!(results[1].as_ref().unwrap().fields, vec!["B\"", "0"]);
        assert!(matches!(results[2], Err(ReaderError::Syntax { .. })));
    }

    #[test]
    fn test_leading_bom_is_ignored() {
        let bytes: &[u8] = b"\xef\xbb\xbf\"\",Red\nFoo,1\n";
        let mut r = TabularReader::new(bytes, &ReaderOptions::default());
        assert_eq!(r.header().unwrap(), vec!["", "Red"]);
        let rows: Vec<Record> = r.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows[0].fields, vec!["Foo", "1"]);
    }

    #[test]
    fn test_validate_quotes() {
        assert!(validate_quotes(b"a,\"b,c\",\"\"\"\"\n", b',').is_ok());
        assert!(validate_quotes(b"\"a\";b\r\n", b';').is_ok());
        assert!(validate_quotes(b"\"a\nb\"\n", b',').is_ok());
        assert!(validate_quotes(b"\"a,b\n", b',').is_err());
        assert!(validate_quotes(b"a\"b\n", b',').is_err());
        assert!(validate_quotes(b"\"a\" ,b\n", b',').is_err());
        assert!(validate_quotes(b"\"a\";b\n", b',').is_err());
    }
}
