//! Line-oriented edge event reader.
//!
//! TTL-mode records are `u<TAB>v<TAB>timestamp`; explicit-mode records carry a
//! leading action marker: `+|-<TAB>u<TAB>v<TAB>timestamp`. Timestamps are Unix
//! seconds and may be fractional. Any malformed record is fatal.

use chrono::{DateTime, TimeZone, Utc};
use std::io::BufRead;

use crate::config::RemovalMode;
use crate::types::{EdgeAction, EdgeEvent, NodeId};

/// Field separator.
pub const FIELD_SEPARATOR: char = '\t';

/// Error while reading the input stream.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The record at `line` could not be parsed.
    #[error("malformed record at line {line}: {reason}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },
    /// Reading failed.
    #[error("read error at line {line}: {source}")]
    Io {
        /// 1-based line number.
        line: usize,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Iterator over the edge events of a reader.
pub struct EdgeEventReader<R> {
    reader: R,
    mode: RemovalMode,
    line: usize,
    buf: String,
}

impl<R: BufRead> EdgeEventReader<R> {
    /// Create a reader expecting records in `mode`'s layout.
    pub fn new(reader: R, mode: RemovalMode) -> Self {
        Self {
            reader,
            mode,
            line: 0,
            buf: String::new(),
        }
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for EdgeEventReader<R> {
    type Item = Result<EdgeEvent, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            self.line += 1;
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(source) => return Some(Err(InputError::Io { line: self.line, source })),
            }
            let record = self.buf.trim_end();
            if record.is_empty() {
                continue;
            }
            return Some(parse_record(record, self.mode, self.line));
        }
    }
}

/// Parse one record in `mode`'s layout.
pub fn parse_record(record: &str, mode: RemovalMode, line: usize) -> Result<EdgeEvent, InputError> {
    let malformed = |reason: String| InputError::Malformed { line, reason };
    let fields: Vec<&str> = record.split(FIELD_SEPARATOR).map(str::trim).collect();

    let (action, rest) = match mode {
        RemovalMode::Ttl => {
            if fields.len() != 3 {
                return Err(malformed(format!("expected 3 fields, found {}", fields.len())));
            }
            (EdgeAction::Insert, &fields[..])
        }
        RemovalMode::Explicit => {
            if fields.len() != 4 {
                return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
            }
            let action = EdgeAction::from_marker(fields[0])
                .ok_or_else(|| malformed(format!("unknown action marker '{}'", fields[0])))?;
            (action, &fields[1..])
        }
    };

    let u = parse_node(rest[0]).map_err(&malformed)?;
    let v = parse_node(rest[1]).map_err(&malformed)?;
    let timestamp = parse_timestamp(rest[2]).map_err(&malformed)?;

    Ok(EdgeEvent { action, u, v, timestamp })
}

fn parse_node(field: &str) -> Result<NodeId, String> {
    field
        .parse::<u64>()
        .map(NodeId::new)
        .map_err(|_| format!("invalid node id '{field}'"))
}

fn parse_timestamp(field: &str) -> Result<DateTime<Utc>, String> {
    let secs: f64 = field
        .parse()
        .map_err(|_| format!("invalid timestamp '{field}'"))?;
    if !secs.is_finite() {
        return Err(format!("invalid timestamp '{field}'"));
    }
    let millis = (secs * 1000.0).round() as i64;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| format!("timestamp out of range '{field}'"))
}
