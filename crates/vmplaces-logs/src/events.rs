//! Reader of the per-run event streams.
//!
//! The `events` directory holds one subdirectory per run, named `<kind>-<algorithm>-<hosts>-<turn off>`,
//! with an `events.json` file inside. Each line of that file is a separate JSON document:
//!
//! ```text
//! {"time": 120.5, "value": "NB_VM", "data": {"value": 42}}
//! ```
//!
//! A malformed line is reported to [`Diagnostics`] and skipped, the rest of the stream is still read.

use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use lazy_static::lazy_static;
use log::{error, info};
use ordered_float::OrderedFloat;
use regex::Regex;
use serde_json::Value;

use crate::config::{algorithm_name, parse_bool, CENTRALIZED_KIND, EVENTS_FILE, VM_COUNT_TAG};
use crate::error::ReportError;
use crate::stats::{ExperimentStats, RunKey};

lazy_static! {
    static ref RUN_DIR: Regex = Regex::new(r"(\w+)-([\w\d]+)-(\d+)-(true|false)").unwrap();
}

/// Outcome of parsing a single event line.
#[derive(Clone, Debug, PartialEq)]
pub enum EventRecord {
    VmCount { time: f64, count: u64 },
    Other,
}

/// Reason why an event line was skipped.
#[derive(Debug)]
pub enum EventParseError {
    Json(serde_json::Error),
    MissingField(&'static str),
    InvalidNumber { field: &'static str, value: String },
}

impl Display for EventParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EventParseError::Json(e) => write!(f, "invalid JSON: {}", e),
            EventParseError::MissingField(field) => write!(f, "missing field '{}'", field),
            EventParseError::InvalidNumber { field, value } => {
                write!(f, "field '{}' is not a number: {}", field, value)
            }
        }
    }
}

impl std::error::Error for EventParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EventParseError::Json(e) => Some(e),
            _ => None,
        }
    }
}

/// Receives the event lines which could not be parsed.
pub trait Diagnostics {
    fn malformed_record(&mut self, path: &Path, line_no: usize, line: &str, error: &EventParseError);
}

/// Reports malformed event lines through the `log` facade.
#[derive(Default)]
pub struct LogDiagnostics {}

impl Diagnostics for LogDiagnostics {
    fn malformed_record(&mut self, path: &Path, line_no: usize, line: &str, err: &EventParseError) {
        let mut message = format!("{}:{}: {}", path.display(), line_no, err);
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        error!("{}\n  {}", message, line);
    }
}

/// Run parameters encoded in an event directory name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunDirectory {
    pub kind: String,
    pub algorithm_class: String,
    pub hosts: u32,
    pub turn_off: bool,
}

impl RunDirectory {
    /// Parses a directory name, returns `None` if it does not describe a run.
    pub fn parse(name: &str) -> Result<Option<Self>, ReportError> {
        let caps = match RUN_DIR.captures(name) {
            Some(caps) => caps,
            None => return Ok(None),
        };
        let hosts = caps[3]
            .parse()
            .map_err(|_| ReportError::InvalidNumber(caps[3].to_string()))?;
        Ok(Some(Self {
            kind: caps[1].to_string(),
            algorithm_class: caps[2].to_string(),
            hosts,
            turn_off: parse_bool(&caps[4])?,
        }))
    }

    pub fn key(&self) -> Result<RunKey, ReportError> {
        Ok(RunKey::new(self.hosts, self.turn_off, algorithm_name(&self.algorithm_class)?))
    }
}

fn number_field(value: &Value, field: &'static str) -> Result<f64, EventParseError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.ok_or_else(|| EventParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Parses a single line of an event stream.
pub fn parse_event_line(line: &str) -> Result<EventRecord, EventParseError> {
    let event: Value = serde_json::from_str(line).map_err(EventParseError::Json)?;
    let tag = event.get("value").ok_or(EventParseError::MissingField("value"))?;
    if tag.as_str() != Some(VM_COUNT_TAG) {
        return Ok(EventRecord::Other);
    }
    let time = number_field(event.get("time").ok_or(EventParseError::MissingField("time"))?, "time")?;
    let count = event
        .get("data")
        .and_then(|data| data.get("value"))
        .ok_or(EventParseError::MissingField("data.value"))?;
    let count = number_field(count, "data.value")?;
    if count < 0. {
        return Err(EventParseError::InvalidNumber {
            field: "data.value",
            value: count.to_string(),
        });
    }
    Ok(EventRecord::VmCount {
        time,
        count: count.trunc() as u64,
    })
}

/// Counts of the records read from one event stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventFileStats {
    pub samples: usize,
    pub skipped: usize,
}

/// Reads one event stream into the VM population of the run `key`.
///
/// A VM count reported twice for the same time keeps the last value.
pub fn scan_event_stream<R: BufRead>(
    reader: R,
    path: &Path,
    key: RunKey,
    stats: &mut ExperimentStats,
    diagnostics: &mut dyn Diagnostics,
) -> Result<EventFileStats, ReportError> {
    let series = stats.vm_population.entry(key).or_default();
    let mut result = EventFileStats::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(ReportError::io(path))?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_event_line(&line) {
            Ok(EventRecord::VmCount { time, count }) => {
                series.insert(OrderedFloat(time), count);
                result.samples += 1;
            }
            Ok(EventRecord::Other) => {}
            Err(e) => {
                diagnostics.malformed_record(path, idx + 1, &line, &e);
                result.skipped += 1;
            }
        }
    }
    Ok(result)
}

/// Reads the event streams of all centralized runs found in `events_dir`.
///
/// Directories are visited in name order.
pub fn read_events_dir(
    events_dir: &Path,
    stats: &mut ExperimentStats,
    diagnostics: &mut dyn Diagnostics,
) -> Result<(), ReportError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(events_dir).map_err(ReportError::io(events_dir))? {
        let entry = entry.map_err(ReportError::io(events_dir))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    for name in names {
        let run = match RunDirectory::parse(&name)? {
            Some(run) if run.kind == CENTRALIZED_KIND => run,
            _ => continue,
        };
        let key = run.key()?;
        let path = events_dir.join(&name).join(EVENTS_FILE);
        println!("Reading {}", path.display());
        let file = File::open(&path).map_err(ReportError::io(&path))?;
        let counts = scan_event_stream(BufReader::new(file), &path, key, stats, diagnostics)?;
        info!(
            "{}: {} VM count samples, {} malformed lines skipped",
            path.display(),
            counts.samples,
            counts.skipped
        );
    }
    Ok(())
}
