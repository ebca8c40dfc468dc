//! Log records and the CloudFront standard log format
use crate::error::ForwarderError;
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::warn;

/// One log line, keyed by field name
pub type Record = BTreeMap<String, String>;

/// # Groups records by the value of `key`
///
/// Each group keeps the original relative order of its records.
/// Records without `key` are dropped.
pub fn group_by(records: Vec<Record>, key: &str) -> BTreeMap<String, Vec<Record>> {
    let mut dropped = 0;
    let mut groups: BTreeMap<String, Vec<Record>> = BTreeMap::new();
    for record in records {
        match record.get(key) {
            Some(value) => groups.entry(value.clone()).or_default().push(record),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(dropped, key, "Dropped records without the grouping field");
    }
    groups
}

/// # Parses a CloudFront standard log file into records
///
/// Field names come from the `#Fields:` directive, values are tab separated.
/// Other directives and blank lines are skipped.
pub fn parse_cloudfront_log(contents: &str) -> Result<Vec<Record>, ForwarderError> {
    let mut fields: Option<Vec<&str>> = None;
    let mut records = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if let Some(directive) = line.strip_prefix('#') {
            if let Some(names) = directive.strip_prefix("Fields:") {
                fields = Some(names.split_whitespace().collect());
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        let names = fields
            .as_ref()
            .ok_or(ForwarderError::MissingFieldsHeader {
                line_number: index + 1,
            })?;
        let record: Record = names
            .iter()
            .zip(line.split('\t'))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        records.push(record);
    }
    Ok(records)
}

/// # Reads the text of a log file
///
/// Files named `*.gz` are gunzipped first.
pub fn decode_log_file(name: &str, bytes: &[u8]) -> Result<String, ForwarderError> {
    let mut contents = String::new();
    if name.ends_with(".gz") {
        GzDecoder::new(bytes).read_to_string(&mut contents)?;
    } else {
        let mut reader = bytes;
        reader.read_to_string(&mut contents)?;
    }
    Ok(contents)
}
