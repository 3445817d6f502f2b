//! CSV output for the aggregated dataset.
//!
//! File contract:
//! - UTF-8 with a byte-order mark
//! - comma delimiter, `\n` record terminator, header row first, no index column
//! - JSON numbers unquoted; every other value quoted, decided by the value's
//!   type and never by its text (`"00501"` stays a quoted string)
//! - missing and null values are an empty quoted field, booleans are
//!   `True`/`False`, nested arrays and objects are their compact JSON text
//! - backslash escaping: `"` is written as `\"` and `\` as `\\`

use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use serde_json::Value;

use crate::error::AppError;
use crate::models::AggregatedDataset;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const DELIMITER: u8 = b',';
pub const QUOTE: u8 = b'"';
pub const ESCAPE: u8 = b'\\';
const TERMINATOR: u8 = b'\n';

/// A CSV file read back as plain strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One encoded cell.
enum Field<'a> {
    /// Written as-is.
    Bare(String),
    /// Wrapped in quotes, with quotes and backslashes escaped.
    Quoted(Cow<'a, str>),
}

impl<'a> Field<'a> {
    fn from_value(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::Number(n)) => Field::Bare(n.to_string()),
            None | Some(Value::Null) => Field::Quoted(Cow::Borrowed("")),
            Some(Value::Bool(true)) => Field::Quoted(Cow::Borrowed("True")),
            Some(Value::Bool(false)) => Field::Quoted(Cow::Borrowed("False")),
            Some(Value::String(s)) => Field::Quoted(Cow::Borrowed(s)),
            Some(other) => Field::Quoted(Cow::Owned(other.to_string())),
        }
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            Field::Bare(text) => buf.extend_from_slice(text.as_bytes()),
            Field::Quoted(text) => {
                buf.push(QUOTE);
                // Both bytes are ASCII, so they never split a UTF-8 sequence.
                for byte in text.bytes() {
                    if byte == QUOTE || byte == ESCAPE {
                        buf.push(ESCAPE);
                    }
                    buf.push(byte);
                }
                buf.push(QUOTE);
            }
        }
    }
}

fn push_record<'a>(buf: &mut Vec<u8>, fields: impl IntoIterator<Item = Field<'a>>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            buf.push(DELIMITER);
        }
        field.encode_into(buf);
    }
    buf.push(TERMINATOR);
}

/// Serialize `dataset` and write it to `path` in one step.
///
/// The bytes go to a sibling `.tmp` file first and are renamed into place,
/// so a failed write never leaves a partial file behind. Returns the number
/// of data rows written.
pub fn write_dataset(dataset: &AggregatedDataset, path: &Path) -> Result<usize, AppError> {
    let bytes = encode_dataset(dataset);
    let tmp = tmp_path(path);

    if let Err(e) = std::fs::write(&tmp, &bytes).and_then(|()| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(AppError::IoError(e));
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "CSV written");
    Ok(dataset.len())
}

/// Encode the dataset as BOM-prefixed CSV bytes.
///
/// A dataset without any columns encodes to the BOM alone.
pub fn encode_dataset(dataset: &AggregatedDataset) -> Vec<u8> {
    let mut buf = UTF8_BOM.to_vec();
    let columns = dataset.columns();
    if columns.is_empty() {
        return buf;
    }

    push_record(
        &mut buf,
        columns.iter().map(|c| Field::Quoted(Cow::Borrowed(c.as_str()))),
    );
    for record in dataset.records() {
        push_record(
            &mut buf,
            columns
                .iter()
                .map(|column| Field::from_value(record.get(column))),
        );
    }
    buf
}

/// Read a file written by [`write_dataset`] back into strings.
pub fn read_dataset(path: &Path) -> Result<CsvTable, AppError> {
    let bytes = std::fs::read(path)?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    if body.is_empty() {
        return Ok(CsvTable {
            headers: Vec::new(),
            rows: Vec::new(),
        });
    }

    let mut rdr = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .quote(QUOTE)
        .double_quote(false)
        .escape(Some(ESCAPE))
        .has_headers(true)
        .from_reader(body);

    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let rows = rdr
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

    Ok(CsvTable { headers, rows })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
