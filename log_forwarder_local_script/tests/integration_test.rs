use assert_cmd::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::fs::write;
use std::process::Command;
use testlib::*;
use wiremock::MockServer;

fn log_forwarder(input_dir: &TempDir, server: &MockServer) -> Command {
    let mut cmd: Command = Command::cargo_bin("log-forwarder").unwrap();
    cmd.arg("--input")
        .arg(input_dir.path().to_str().unwrap())
        .arg("--log-group")
        .arg(TEST_LOG_GROUP)
        .arg("--region")
        .arg(TEST_REGION)
        .arg("--endpoint-url")
        .arg(server.uri())
        .env("AWS_ACCESS_KEY_ID", "test")
        .env("AWS_SECRET_ACCESS_KEY", "test")
        .env("AWS_EC2_METADATA_DISABLED", "true")
        .env_remove("AWS_PROFILE");
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn forwards_the_log_files_in_the_input_folder() {
    let server = MockServer::start().await;
    mount_describe_log_streams(&server, "2024-01-01", vec![log_stream("2024-01-01", "token-1")])
        .await;
    mount_missing_then_created_log_stream(&server, "2024-01-02", "token-2").await;
    mount_create_log_stream(&server).await;
    mount_put_log_events(&server, "next-token").await;
    let input_dir: TempDir = TempDir::new().unwrap();
    create_log_file(&input_dir, "E2EXAMPLE.2024-01-02-10.abcd1234.gz", cloudfront_log());

    log_forwarder(&input_dir, &server)
        .assert()
        .success()
        .stdout(predicate::str::contains("Forwarded 3 events from"));

    assert_eq!(requests_for(&server, CREATE_LOG_STREAM).await.len(), 1);
    let put_requests = requests_for(&server, PUT_LOG_EVENTS).await;
    assert_eq!(put_requests.len(), 2);
    assert!(put_requests
        .iter()
        .all(|request| json_body(request)["logGroupName"] == TEST_LOG_GROUP));
}

#[tokio::test(flavor = "multi_thread")]
async fn error_if_invalid_gzip_file() {
    let server = MockServer::start().await;
    let input_dir: TempDir = TempDir::new().unwrap();
    write(input_dir.join("test.gz"), "not a gzip file").unwrap();

    log_forwarder(&input_dir, &server)
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid gzip header"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn error_if_log_stream_is_ambiguous() {
    let server = MockServer::start().await;
    mount_describe_log_streams(
        &server,
        "2024-01-01",
        vec![log_stream("2024-01-01", "token-1"), log_stream("2024-01-01-old", "token-2")],
    )
    .await;
    mount_describe_log_streams(&server, "2024-01-02", vec![log_stream("2024-01-02", "token-3")])
        .await;
    mount_put_log_events(&server, "next-token").await;
    let input_dir: TempDir = TempDir::new().unwrap();
    create_log_file(&input_dir, "E2EXAMPLE.2024-01-02-10.abcd1234.gz", cloudfront_log());

    log_forwarder(&input_dir, &server)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Found '2' log streams matching '2024-01-01' but expected 1",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn error_if_log_line_has_no_fields_header() {
    let server = MockServer::start().await;
    let input_dir: TempDir = TempDir::new().unwrap();
    create_log_file(&input_dir, "no-header.gz", "2024-01-01\t10:00:00\n");

    log_forwarder(&input_dir, &server)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Log line 1 appears before the #Fields header",
        ));
}
