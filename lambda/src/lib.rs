//! CloudFront log forwarder lambda
//!
//! This lambda is used to copy CloudFront standard logs from S3 into CloudWatch Logs
//!
//! It is triggered by the S3 `ObjectCreated` notification for each log file CloudFront delivers.
//! For every record in the event the lambda will:
//! * Download the log file from S3
//! * Gunzip it and parse the lines into records
//! * Write the records to one log stream per date in the log group in the `LOG_GROUP_NAME` environment variable
use aws_lambda_events::s3::{S3Event, S3EventRecord};
use aws_sdk_cloudwatchlogs::Client as CloudWatchLogsClient;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::Error;
use log_forwarder_lib::{
    aws_config, decode_log_file, parse_cloudfront_log, put_log_events, ForwarderConfig,
    SubmissionResult,
};
use tracing::info;

/// # The bucket and key of the log file in an S3 event record
pub fn object_location(record: &S3EventRecord) -> Result<(&str, &str), Error> {
    let bucket = record
        .s3
        .bucket
        .name
        .as_deref()
        .ok_or("No bucket name found in the S3 event record")?;
    let key = record
        .s3
        .object
        .key
        .as_deref()
        .ok_or("No object key found in the S3 event record")?;
    Ok((bucket, key))
}

/// # Processes every record in the S3 event.
///
/// Records are forwarded in order and their results concatenated. The first failure stops the event.
pub async fn process_event(
    s3_client: &S3Client,
    logs_client: &CloudWatchLogsClient,
    config: &ForwarderConfig,
    event: &S3Event,
) -> Result<Vec<SubmissionResult>, Error> {
    let mut results = Vec::new();
    for record in event.records.iter() {
        results.extend(process_record(s3_client, logs_client, config, record).await?);
    }
    Ok(results)
}

/// # Processes the S3 event record.
///
/// This will download the log file specified in the record and write its lines to CloudWatch.
pub async fn process_record(
    s3_client: &S3Client,
    logs_client: &CloudWatchLogsClient,
    config: &ForwarderConfig,
    record: &S3EventRecord,
) -> Result<Vec<SubmissionResult>, Error> {
    let (bucket, key) = object_location(record)?;
    forward_object(s3_client, logs_client, config, bucket, key).await
}

/// # Forwards a CloudFront log file stored in S3
pub async fn forward_object(
    s3_client: &S3Client,
    logs_client: &CloudWatchLogsClient,
    config: &ForwarderConfig,
    bucket: &str,
    key: &str,
) -> Result<Vec<SubmissionResult>, Error> {
    let bytes = download(s3_client, bucket, key).await?;
    let contents = decode_log_file(key, &bytes)?;
    let records = parse_cloudfront_log(&contents)?;
    info!(bucket, key, records = records.len(), "Parsed log file");
    Ok(put_log_events(logs_client, config, records).await?)
}

/// # Downloads the specified file
///
/// This reads the whole object in the S3 `bucket` with the specified `key` into memory
async fn download(client: &S3Client, bucket: &str, key: &str) -> Result<Vec<u8>, Error> {
    let object = client.get_object().bucket(bucket).key(key).send().await?;
    let bytes = object.body.collect().await?.into_bytes();
    Ok(bytes.to_vec())
}

/// # Creates an S3 client
pub async fn create_s3_client(potential_endpoint_url: Option<&str>) -> S3Client {
    let config = aws_config(None, potential_endpoint_url).await;
    S3Client::new(&config)
}

#[cfg(test)]
mod test {
    use super::*;
    use aws_lambda_events::s3::{S3Bucket, S3Entity, S3Object};

    fn s3_event_record(bucket: Option<&str>, key: Option<&str>) -> S3EventRecord {
        S3EventRecord {
            s3: S3Entity {
                bucket: S3Bucket {
                    name: bucket.map(str::to_string),
                    ..Default::default()
                },
                object: S3Object {
                    key: key.map(str::to_string),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_object_location() {
        let record = s3_event_record(Some("cloudfront-logs"), Some("E2EXAMPLE.2024-01-01-10.abcd.gz"));

        let (bucket, key) = object_location(&record).unwrap();

        assert_eq!(bucket, "cloudfront-logs");
        assert_eq!(key, "E2EXAMPLE.2024-01-01-10.abcd.gz");
    }

    #[test]
    fn test_object_location_missing_fields() {
        let missing_bucket = s3_event_record(None, Some("key.gz"));
        let missing_key = s3_event_record(Some("bucket"), None);

        assert_eq!(
            object_location(&missing_bucket).unwrap_err().to_string(),
            "No bucket name found in the S3 event record"
        );
        assert_eq!(
            object_location(&missing_key).unwrap_err().to_string(),
            "No object key found in the S3 event record"
        );
    }

    #[tokio::test]
    async fn test_create_s3_client_with_endpoint() {
        let client = create_s3_client(Some("https://example.com")).await;

        assert!(client.config().region().is_some());
    }
}
