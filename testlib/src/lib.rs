//! # Test library functions
//!
//! These are common functions used in the tests for the library, the script and the lambda.
use assert_fs::TempDir;
use aws_sdk_cloudwatchlogs::Client as CloudWatchLogsClient;
use aws_sdk_s3::Client as S3Client;
use flate2::{write::GzEncoder, Compression};
use serde_json::{json, Value};
use std::fs::write;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TEST_REGION: &str = "eu-west-2";
pub const TEST_LOG_GROUP: &str = "test-log-group";

pub const DESCRIBE_LOG_STREAMS: &str = "Logs_20140328.DescribeLogStreams";
pub const CREATE_LOG_STREAM: &str = "Logs_20140328.CreateLogStream";
pub const PUT_LOG_EVENTS: &str = "Logs_20140328.PutLogEvents";

/// # A CloudFront log with two lines on 2024-01-02 and one on 2024-01-01
///
/// The 2024-01-02 lines are out of timestamp order.
pub fn cloudfront_log() -> &'static str {
    concat!(
        "#Version: 1.0\n",
        "#Fields: date time x-edge-location sc-bytes c-ip cs-method cs(Host) cs-uri-stem sc-status\n",
        "2024-01-02\t10:00:02\tLHR62-C2\t2390\t192.0.2.10\tGET\td111111abcdef8.cloudfront.net\t/index.html\t200\n",
        "2024-01-01\t23:59:59\tLHR62-C2\t512\t192.0.2.11\tGET\td111111abcdef8.cloudfront.net\t/favicon.ico\t404\n",
        "2024-01-02\t09:15:00\tLHR50-C1\t4096\t192.0.2.12\tGET\td111111abcdef8.cloudfront.net\t/app.js\t200\n",
    )
}

/// # Gzips the contents
pub fn gzip(contents: &str) -> Vec<u8> {
    let mut encoder: GzEncoder<Vec<u8>> = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(contents.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

/// # Creates a gzipped log file in the input directory
pub fn create_log_file(input_dir: &TempDir, file_name: &str, contents: &str) -> PathBuf {
    let log_path: PathBuf = input_dir.join(file_name);
    write(&log_path, gzip(contents)).unwrap();
    log_path
}

/// # A CloudWatch Logs client which sends requests to the mock server
pub fn logs_client(endpoint_url: &str) -> CloudWatchLogsClient {
    use aws_sdk_cloudwatchlogs::config::{BehaviorVersion, Credentials, Region};
    let config = aws_sdk_cloudwatchlogs::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(TEST_REGION))
        .credentials_provider(Credentials::new("test", "test", None, None, "testlib"))
        .endpoint_url(endpoint_url)
        .build();
    CloudWatchLogsClient::from_conf(config)
}

/// # An S3 client which sends path style requests to the mock server
pub fn s3_client(endpoint_url: &str) -> S3Client {
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(TEST_REGION))
        .credentials_provider(Credentials::new("test", "test", None, None, "testlib"))
        .endpoint_url(endpoint_url)
        .force_path_style(true)
        .build();
    S3Client::from_conf(config)
}

/// # The JSON for a log stream in a DescribeLogStreams response
pub fn log_stream(name: &str, upload_sequence_token: &str) -> Value {
    json!({
        "logStreamName": name,
        "uploadSequenceToken": upload_sequence_token,
        "arn": format!("arn:aws:logs:eu-west-2:123456789012:log-group:{TEST_LOG_GROUP}:log-stream:{name}")
    })
}

fn logs_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/x-amz-json-1.1")
        .set_body_string(body.to_string())
}

fn logs_mock(target: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", target))
}

/// # Answers DescribeLogStreams for the prefix with the given streams
pub async fn mount_describe_log_streams(server: &MockServer, prefix: &str, log_streams: Vec<Value>) {
    logs_mock(DESCRIBE_LOG_STREAMS)
        .and(body_partial_json(json!({ "logStreamNamePrefix": prefix })))
        .respond_with(logs_response(json!({ "logStreams": log_streams })))
        .mount(server)
        .await;
}

/// # Answers DescribeLogStreams for the prefix with the given streams after `delay`
pub async fn mount_delayed_describe_log_streams(
    server: &MockServer,
    prefix: &str,
    log_streams: Vec<Value>,
    delay: Duration,
) {
    logs_mock(DESCRIBE_LOG_STREAMS)
        .and(body_partial_json(json!({ "logStreamNamePrefix": prefix })))
        .respond_with(logs_response(json!({ "logStreams": log_streams })).set_delay(delay))
        .mount(server)
        .await;
}

/// # Answers the first DescribeLogStreams for the prefix with no streams, and later ones with the stream
pub async fn mount_missing_then_created_log_stream(server: &MockServer, prefix: &str, token: &str) {
    logs_mock(DESCRIBE_LOG_STREAMS)
        .and(body_partial_json(json!({ "logStreamNamePrefix": prefix })))
        .respond_with(logs_response(json!({ "logStreams": [] })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
    mount_describe_log_streams(server, prefix, vec![log_stream(prefix, token)]).await;
}

pub async fn mount_create_log_stream(server: &MockServer) {
    logs_mock(CREATE_LOG_STREAM)
        .respond_with(logs_response(json!({})))
        .mount(server)
        .await;
}

pub async fn mount_put_log_events(server: &MockServer, next_sequence_token: &str) {
    logs_mock(PUT_LOG_EVENTS)
        .respond_with(logs_response(
            json!({ "nextSequenceToken": next_sequence_token }),
        ))
        .mount(server)
        .await;
}

/// # Accepts PutLogEvents but reports the events older than the retention period as rejected
pub async fn mount_put_log_events_with_rejected(server: &MockServer, next_sequence_token: &str) {
    logs_mock(PUT_LOG_EVENTS)
        .respond_with(logs_response(json!({
            "nextSequenceToken": next_sequence_token,
            "rejectedLogEventsInfo": { "expiredLogEventEndIndex": 1 }
        })))
        .mount(server)
        .await;
}

/// # Answers every CloudWatch Logs call with a service error
pub async fn mount_logs_error(server: &MockServer, target: &str, status: u16) {
    logs_mock(target)
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "application/x-amz-json-1.1")
                .set_body_string(
                    json!({
                        "__type": "ResourceNotFoundException",
                        "message": "The specified log group does not exist."
                    })
                    .to_string(),
                ),
        )
        .mount(server)
        .await;
}

/// # The CloudWatch Logs requests received for an operation
pub async fn requests_for(server: &MockServer, target: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| {
            request
                .headers
                .get("x-amz-target")
                .and_then(|value| value.to_str().ok())
                == Some(target)
        })
        .collect()
}

/// # The request body parsed as JSON
pub fn json_body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}
