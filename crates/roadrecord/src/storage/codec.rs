//! Flat-file record encoding.
//!
//! Each record occupies exactly six lines:
//!
//! ```text
//! Name: <first> <last>
//! ID: <identifier>
//! Address: <address>
//! Birth Date: <DD-MM-YYYY>
//! Demerit History: <points> on <YYYY-MM-DD>, <points> on <YYYY-MM-DD>
//! <blank>
//! ```
//!
//! Records follow each other in insertion order with no header.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::record::{DemeritHistory, Record};

/// Lines per record block, including the blank separator.
pub const LINES_PER_RECORD: usize = 6;

/// Offset of the identifier line within a block.
pub const ID_LINE_OFFSET: usize = 1;

const NAME_LABEL: &str = "Name: ";
const ID_LABEL: &str = "ID: ";
const ADDRESS_LABEL: &str = "Address: ";
const BIRTH_DATE_LABEL: &str = "Birth Date: ";
const HISTORY_LABEL: &str = "Demerit History: ";

const HISTORY_SEPARATOR: &str = ", ";
const HISTORY_ENTRY_SEPARATOR: &str = " on ";
const HISTORY_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a demerit history as `"<points> on <date>"` entries joined by `", "`.
#[must_use]
pub fn encode_history(history: &DemeritHistory) -> String {
    history
        .iter()
        .map(|(date, points)| {
            format!(
                "{points}{HISTORY_ENTRY_SEPARATOR}{}",
                date.format(HISTORY_DATE_FORMAT)
            )
        })
        .collect::<Vec<_>>()
        .join(HISTORY_SEPARATOR)
}

/// Parse a demerit history line body.
///
/// # Errors
///
/// Returns a description of the first entry that cannot be parsed.
pub fn decode_history(text: &str) -> std::result::Result<DemeritHistory, String> {
    let mut history = DemeritHistory::new();
    if text.trim().is_empty() {
        return Ok(history);
    }

    for entry in text.split(HISTORY_SEPARATOR) {
        let (points, date) = entry
            .split_once(HISTORY_ENTRY_SEPARATOR)
            .ok_or_else(|| format!("demerit entry {entry:?} is not \"<points> on <date>\""))?;
        let points: u8 = points
            .trim()
            .parse()
            .map_err(|_| format!("demerit points {points:?} are not a number"))?;
        let date = NaiveDate::parse_from_str(date.trim(), HISTORY_DATE_FORMAT)
            .map_err(|_| format!("offense date {date:?} is not YYYY-MM-DD"))?;
        history.record(date, points);
    }

    Ok(history)
}

/// Encode one record as its six-line block.
#[must_use]
pub fn encode_record(record: &Record) -> Vec<String> {
    vec![
        format!("{NAME_LABEL}{}", record.full_name()),
        format!("{ID_LABEL}{}", record.id),
        format!("{ADDRESS_LABEL}{}", record.address),
        format!("{BIRTH_DATE_LABEL}{}", record.birth_date),
        format!("{HISTORY_LABEL}{}", encode_history(&record.demerit_history)),
        String::new(),
    ]
}

/// Encode records in order.
#[must_use]
pub fn encode_records(records: &[Record]) -> Vec<String> {
    records.iter().flat_map(encode_record).collect()
}

/// Join lines into file text, terminating every line with a newline.
#[must_use]
pub fn render(lines: &[String]) -> String {
    let mut text = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// Read the identifier from a block without decoding the rest of it.
#[must_use]
pub fn block_identifier(block: &[String]) -> Option<&str> {
    block
        .get(ID_LINE_OFFSET)
        .and_then(|line| line.strip_prefix(ID_LABEL))
}

/// Decode all records from store lines.
///
/// A trailing partial block made only of blank lines is ignored, and the
/// separator line of the final block may be missing.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] with the 1-based line number of the
/// first line that does not fit the block format.
pub fn decode_records(lines: &[String]) -> Result<Vec<Record>> {
    let mut records = Vec::with_capacity(lines.len() / LINES_PER_RECORD);

    for (index, block) in lines.chunks(LINES_PER_RECORD).enumerate() {
        let first_line = index * LINES_PER_RECORD + 1;
        if block.iter().all(|line| line.trim().is_empty()) {
            continue;
        }
        records.push(decode_block(block, first_line)?);
    }

    Ok(records)
}

fn decode_block(block: &[String], first_line: usize) -> Result<Record> {
    if block.len() < LINES_PER_RECORD - 1 {
        return Err(Error::malformed(
            first_line + block.len(),
            format!(
                "record block has {} lines, expected {LINES_PER_RECORD}",
                block.len()
            ),
        ));
    }

    let name = labelled(block, first_line, 0, NAME_LABEL)?;
    let (first_name, last_name) = name.split_once(' ').unwrap_or((name, ""));
    let id = labelled(block, first_line, ID_LINE_OFFSET, ID_LABEL)?;
    let address = labelled(block, first_line, 2, ADDRESS_LABEL)?;
    let birth_date = labelled(block, first_line, 3, BIRTH_DATE_LABEL)?;
    let history = decode_history(labelled(block, first_line, 4, HISTORY_LABEL)?)
        .map_err(|message| Error::malformed(first_line + 4, message))?;

    if let Some(separator) = block.get(5) {
        if !separator.trim().is_empty() {
            return Err(Error::malformed(
                first_line + 5,
                "expected blank separator line",
            ));
        }
    }

    let mut record = Record::new(id, first_name, last_name, address, birth_date);
    record.demerit_history = history;
    Ok(record)
}

fn labelled<'a>(
    block: &'a [String],
    first_line: usize,
    offset: usize,
    label: &str,
) -> Result<&'a str> {
    let line = block[offset].as_str();
    let value = line
        .strip_prefix(label)
        .or_else(|| (line == label.trim_end()).then_some(""));
    value.ok_or_else(|| {
        Error::malformed(
            first_line + offset,
            format!("expected line starting with {:?}", label.trim_end()),
        )
    })
}
