use aws_sdk_cloudwatchlogs::error::{BuildError, SdkError};
use std::env::VarError;
use thiserror::Error;

/// # Errors raised while forwarding log records
///
/// Every variant is fatal: nothing here is retried.
#[derive(Debug, Error)]
pub enum ForwarderError {
    #[error("Found '{count}' log streams matching '{prefix}' but expected 1")]
    AmbiguousLogStream { prefix: String, count: usize },

    #[error("Created log stream '{log_stream_name}' in group '{log_group_name}' but it could not be found")]
    LogStreamNotFound {
        log_group_name: String,
        log_stream_name: String,
    },

    #[error("Cannot parse a timestamp from date '{date}' and time '{time}'")]
    InvalidTimestamp { date: String, time: String },

    #[error("Log line {line_number} appears before the #Fields header")]
    MissingFieldsHeader { line_number: usize },

    #[error("Environment variable {name} is not set")]
    MissingEnvironmentVariable {
        name: &'static str,
        #[source]
        source: VarError,
    },

    #[error(transparent)]
    CloudWatchLogs(#[from] aws_sdk_cloudwatchlogs::Error),

    #[error(transparent)]
    InvalidLogEvent(#[from] BuildError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<E, R> From<SdkError<E, R>> for ForwarderError
where
    aws_sdk_cloudwatchlogs::Error: From<SdkError<E, R>>,
{
    fn from(err: SdkError<E, R>) -> Self {
        ForwarderError::CloudWatchLogs(err.into())
    }
}
