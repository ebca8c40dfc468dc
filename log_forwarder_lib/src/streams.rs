use crate::error::ForwarderError;
use aws_sdk_cloudwatchlogs::types::LogStream;
use aws_sdk_cloudwatchlogs::Client as CloudWatchLogsClient;
use tracing::info;

/// # Looks up the single log stream matching a prefix
///
/// Returns `None` when nothing matches and an error when more than one stream does.
pub async fn find_log_stream(
    client: &CloudWatchLogsClient,
    log_group_name: &str,
    log_stream_name_prefix: &str,
) -> Result<Option<LogStream>, ForwarderError> {
    let output = client
        .describe_log_streams()
        .log_group_name(log_group_name)
        .log_stream_name_prefix(log_stream_name_prefix)
        .send()
        .await?;

    let mut log_streams = output.log_streams.unwrap_or_default();
    if log_streams.len() > 1 {
        return Err(ForwarderError::AmbiguousLogStream {
            prefix: log_stream_name_prefix.to_string(),
            count: log_streams.len(),
        });
    }
    Ok(log_streams.pop())
}

/// # Finds the log stream or creates it
///
/// A stream which cannot be found straight after it was created is an error.
pub async fn describe_log_stream(
    client: &CloudWatchLogsClient,
    log_group_name: &str,
    log_stream_name: &str,
) -> Result<LogStream, ForwarderError> {
    if let Some(log_stream) = find_log_stream(client, log_group_name, log_stream_name).await? {
        return Ok(log_stream);
    }

    info!(log_group_name, log_stream_name, "Creating log stream");
    client
        .create_log_stream()
        .log_group_name(log_group_name)
        .log_stream_name(log_stream_name)
        .send()
        .await?;

    find_log_stream(client, log_group_name, log_stream_name)
        .await?
        .ok_or_else(|| ForwarderError::LogStreamNotFound {
            log_group_name: log_group_name.to_string(),
            log_stream_name: log_stream_name.to_string(),
        })
}
