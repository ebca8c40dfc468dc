//! ## CloudFront log forwarder library
//!
//! This library contains the code shared between the lambda and the local script.
//!
//! Records are grouped by their `date` field and each group is written to the log stream named
//! after that date in the configured CloudWatch log group:
//! * The log stream is looked up by prefix and created if it does not exist
//! * Each record becomes a JSON message tagged with the source name
//! * The events are sorted by timestamp and written with the stream's sequence token
//!
//! The groups are written concurrently and the first failure fails the whole batch.
pub use aws_sdk_cloudwatchlogs::Client as CloudWatchLogsClient;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub mod config;
pub mod error;
pub mod events;
pub mod records;
pub mod streams;

pub use config::{aws_config, create_cloudwatch_logs_client, ForwarderConfig};
pub use error::ForwarderError;
pub use events::{build_log_events, event_timestamp};
pub use records::{decode_log_file, group_by, parse_cloudfront_log, Record};
pub use streams::{describe_log_stream, find_log_stream};

/// Records are written to one log stream per value of this field
pub const GROUPING_FIELD: &str = "date";

/// # The outcome of writing one group of records
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub log_stream_name: String,
    pub event_count: usize,
    pub next_sequence_token: Option<String>,
}

/// # Writes the records to CloudWatch
///
/// Returns one result per date, in ascending date order.
#[tracing::instrument(skip(client, config, records), fields(log_group_name = %config.log_group_name))]
pub async fn put_log_events(
    client: &CloudWatchLogsClient,
    config: &ForwarderConfig,
    records: Vec<Record>,
) -> Result<Vec<SubmissionResult>, ForwarderError> {
    let grouped_records = group_by(records, GROUPING_FIELD);

    let put_log_events_calls = grouped_records
        .iter()
        .map(|(date, records)| put_group(client, config, date, records));

    try_join_all(put_log_events_calls).await
}

async fn put_group(
    client: &CloudWatchLogsClient,
    config: &ForwarderConfig,
    log_stream_name: &str,
    records: &[Record],
) -> Result<SubmissionResult, ForwarderError> {
    let log_stream = describe_log_stream(client, &config.log_group_name, log_stream_name).await?;
    let log_stream_name = log_stream.log_stream_name().unwrap_or(log_stream_name);
    let log_events = build_log_events(records, &config.source_name)?;
    let event_count = log_events.len();

    let output = client
        .put_log_events()
        .set_log_events(Some(log_events))
        .log_group_name(&config.log_group_name)
        .log_stream_name(log_stream_name)
        .set_sequence_token(log_stream.upload_sequence_token().map(str::to_string))
        .send()
        .await?;

    if let Some(rejected) = output.rejected_log_events_info() {
        warn!(log_stream_name, ?rejected, "CloudWatch rejected some log events");
    }
    info!(log_stream_name, event_count, "Put log events");

    Ok(SubmissionResult {
        log_stream_name: log_stream_name.to_string(),
        event_count,
        next_sequence_token: output.next_sequence_token().map(str::to_string),
    })
}
