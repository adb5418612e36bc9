use std::io::{self, BufRead, BufReader, Read};

use csv::{StringRecord, Trim};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use super::grammar::{Delimiter, RowGrammar};
use crate::utilities::split_tokens;

/// Records parsed from command output, plus the number of lines that had to be skipped
#[derive(Clone, Debug, PartialEq)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    /// Non-empty lines dropped because they did not match the grammar
    pub skipped: usize,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
        }
    }
}

/// Parses one-record-per-line output according to `grammar`.
///
/// Lines with an unexpected number of fields, or whose fields cannot be mapped onto `T`,
/// are logged and counted in [`Parsed::skipped`]; only failing to read `reader` is an error.
pub fn parse_rows<T, R>(reader: R, grammar: &RowGrammar) -> io::Result<Parsed<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rows = RowCollector::new(grammar);

    match grammar.delimiter {
        Delimiter::Whitespace => {
            for line in BufReader::new(reader).split(b'\n') {
                let line = line?;
                let record = split_tokens(&line)
                    .map(String::from_utf8_lossy)
                    .collect::<StringRecord>();

                if record.is_empty() {
                    continue;
                }

                rows.push(record, &String::from_utf8_lossy(&line));
            }
        }
        Delimiter::Char(delimiter) => {
            let mut reader = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .has_headers(false)
                .flexible(true)
                // Job names and reasons may contain quotes; fields are never quoted
                .quoting(false)
                .trim(Trim::All)
                .from_reader(reader);

            let separator = (delimiter as char).to_string();
            for result in reader.records() {
                match result {
                    // Whitespace-only lines are trimmed down to a single empty field
                    Ok(record) if record.len() == 1 && record[0].is_empty() => {}
                    Ok(record) => {
                        let line = record.iter().collect::<Vec<_>>().join(&separator);
                        rows.push(record, &line);
                    }
                    Err(err) => match err.into_kind() {
                        csv::ErrorKind::Io(err) => return Err(err),
                        kind => {
                            warn!(error = ?kind, "unreadable line in command output, skipping");
                            rows.skipped += 1;
                        }
                    },
                }
            }
        }
    }

    Ok(rows.finish())
}

struct RowCollector<'g, T> {
    grammar: &'g RowGrammar,
    headers: StringRecord,
    records: Vec<T>,
    skipped: usize,
}

impl<'g, T> RowCollector<'g, T>
where
    T: DeserializeOwned,
{
    fn new(grammar: &'g RowGrammar) -> Self {
        Self {
            grammar,
            headers: grammar.headers(),
            records: Vec::new(),
            skipped: 0,
        }
    }

    fn push(&mut self, record: StringRecord, line: &str) {
        if record.len() != self.grammar.len() {
            warn!(
                line,
                fields = record.len(),
                expected = self.grammar.len(),
                "invalid line in command output, skipping"
            );
            self.skipped += 1;
            return;
        }

        match record.deserialize::<T>(Some(&self.headers)) {
            Ok(value) => self.records.push(value),
            Err(err) => {
                warn!(line, error = %err, "unparsable line in command output, skipping");
                self.skipped += 1;
            }
        }
    }

    fn finish(self) -> Parsed<T> {
        Parsed {
            records: self.records,
            skipped: self.skipped,
        }
    }
}

/// Deserializes a count, falling back to zero for values such as `N/A` or `4+`
pub fn lenient_count<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr + Default,
{
    let value: &str = Deserialize::deserialize(deserializer)?;

    Ok(value.trim().parse::<T>().unwrap_or_else(|_| {
        debug!(value, "invalid numeric value in command output, using 0");
        T::default()
    }))
}

/// Deserializes an unset limit, i.e. an empty field, as `None`
pub fn optional_count<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let value: &str = Deserialize::deserialize(deserializer)?;
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    let parsed = value.parse::<T>().ok();
    if parsed.is_none() {
        debug!(value, "invalid numeric value in command output, ignoring");
    }

    Ok(parsed)
}

/// Deserializes a comma-separated list, dropping empty entries
pub fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: &str = Deserialize::deserialize(deserializer)?;

    Ok(value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect())
}

/// Deserializes `(null)` and `N/A` as empty strings
pub fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: String = Deserialize::deserialize(deserializer)?;

    match value.as_str() {
        "(null)" | "N/A" => Ok(String::new()),
        _ => Ok(value),
    }
}
