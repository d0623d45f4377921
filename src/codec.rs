//! JSON and CSV encodings of a task collection.
//!
//! Decoding is defensive because it also reads user-supplied files: JSON fails
//! the whole document on any defect, while CSV skips bad rows and keeps going.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::error::CodecError;
use crate::model::Task;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const CSV_HEADER: [&str; 3] = ["ID", "Description", "Done"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Csv,
}

impl Format {
    /// Guess the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        ext.parse().ok()
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("invalid format '{s}': must be json or csv")),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// JSON

/// Pretty-printed with two-space indentation; an empty collection is `[]`.
pub fn encode_json(tasks: &[Task]) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec_pretty(tasks).map_err(CodecError::Encode)
}

/// `path` is only used for error messages.
pub fn decode_json(bytes: &[u8], path: &Path) -> Result<Vec<Task>, CodecError> {
    let bytes = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => {
            debug!(path = %path.display(), "stripped UTF-8 BOM");
            rest
        }
        None => bytes,
    };
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    // A bare `null` document is an empty collection.
    let tasks: Option<Vec<Task>> =
        serde_json::from_slice(bytes).map_err(|source| CodecError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(tasks.unwrap_or_default())
}

/// A missing or empty file is an empty collection.
pub fn load_json(path: &Path) -> Result<Vec<Task>, CodecError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "task file does not exist, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(CodecError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let tasks = decode_json(&bytes, path)?;
    info!(count = tasks.len(), path = %path.display(), "loaded tasks from JSON");
    Ok(tasks)
}

// CSV

/// Write the header and one row per task, returning the inner writer once
/// everything has been flushed into it.
pub fn encode_csv<W: io::Write>(writer: W, tasks: &[Task]) -> Result<W, csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for task in tasks {
        wtr.write_record([
            task.id.to_string(),
            task.description.clone(),
            task.done.to_string(),
        ])?;
    }
    wtr.into_inner().map_err(|e| e.into_error().into())
}

/// Export to `path`, truncating any existing file, and fsync before returning.
pub fn save_csv(path: &Path, tasks: &[Task]) -> Result<(), CodecError> {
    let write_err = |source| CodecError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let file = encode_csv(file, tasks).map_err(|source| CodecError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    file.sync_all().map_err(write_err)?;
    info!(count = tasks.len(), path = %path.display(), "exported tasks to CSV");
    Ok(())
}

/// Rows that parsed, plus how many did not.
#[derive(Debug, Default)]
struct CsvRows {
    tasks: Vec<Task>,
    skipped: usize,
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_row(record: &csv::StringRecord) -> Result<Task, String> {
    if record.len() < 3 {
        return Err(format!("expected 3 fields, got {}", record.len()));
    }
    let id = record[0]
        .parse::<i64>()
        .map_err(|_| format!("invalid ID '{}'", &record[0]))?;
    let done = parse_bool(&record[2]).ok_or_else(|| format!("invalid Done value '{}'", &record[2]))?;
    Ok(Task {
        id,
        description: record[1].to_string(),
        done,
    })
}

fn read_rows<R: Read>(reader: R) -> Result<CsvRows, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = CsvRows::default();
    let mut seen_header = false;
    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e),
            Err(e) => {
                rows.skipped += 1;
                warn!(error = %e, "skipping unreadable CSV record");
                continue;
            }
        };
        // The first readable row is the header, whatever it contains.
        if !seen_header {
            seen_header = true;
            continue;
        }
        match parse_row(&record) {
            Ok(task) => rows.tasks.push(task),
            Err(reason) => {
                rows.skipped += 1;
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                warn!(line, "skipping CSV record: {reason}");
            }
        }
    }
    Ok(rows)
}

/// Decode CSV, skipping malformed rows. The number skipped is logged, not
/// returned. Only an I/O failure on the underlying reader is an error.
pub fn decode_csv<R: Read>(reader: R, path: &Path) -> Result<Vec<Task>, CodecError> {
    let rows = read_rows(reader).map_err(|source| CodecError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    if rows.skipped > 0 {
        warn!(
            loaded = rows.tasks.len(),
            skipped = rows.skipped,
            path = %path.display(),
            "loaded tasks from CSV, skipped invalid records"
        );
    } else {
        info!(count = rows.tasks.len(), path = %path.display(), "loaded tasks from CSV");
    }
    Ok(rows.tasks)
}

pub fn load_csv(path: &Path) -> Result<Vec<Task>, CodecError> {
    let file = File::open(path).map_err(|source| CodecError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_csv(file, path)
}
