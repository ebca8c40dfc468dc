use crate::error::ForwarderError;
use crate::records::Record;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use chrono::NaiveDateTime;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// # Milliseconds since the epoch for a record
///
/// The `date` and `time` fields are read as UTC.
pub fn event_timestamp(record: &Record) -> Result<i64, ForwarderError> {
    let date = record.get("date").map(String::as_str).unwrap_or_default();
    let time = record.get("time").map(String::as_str).unwrap_or_default();
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), TIMESTAMP_FORMAT)
        .map(|date_time| date_time.and_utc().timestamp_millis())
        .map_err(|_| ForwarderError::InvalidTimestamp {
            date: date.to_string(),
            time: time.to_string(),
        })
}

/// # Builds the log events for a group of records
///
/// The message is the record as JSON with `name` set to `source_name`.
/// Events are returned in ascending timestamp order, ties keep their input order.
pub fn build_log_events(
    records: &[Record],
    source_name: &str,
) -> Result<Vec<InputLogEvent>, ForwarderError> {
    let mut events = records
        .iter()
        .map(|record| -> Result<InputLogEvent, ForwarderError> {
            let timestamp = event_timestamp(record)?;
            let mut tagged = record.clone();
            tagged.insert("name".to_string(), source_name.to_string());
            let event = InputLogEvent::builder()
                .message(serde_json::to_string(&tagged)?)
                .timestamp(timestamp)
                .build()?;
            Ok(event)
        })
        .collect::<Result<Vec<_>, _>>()?;
    events.sort_by_key(|event| event.timestamp());
    Ok(events)
}
