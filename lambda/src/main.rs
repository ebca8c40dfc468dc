use aws_lambda_events::event::s3::S3Event;
use aws_sdk_cloudwatchlogs::Client as CloudWatchLogsClient;
use aws_sdk_s3::Client as S3Client;
use lambda::{create_s3_client, process_event};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log_forwarder_lib::{create_cloudwatch_logs_client, ForwarderConfig, SubmissionResult};

async fn function_handler(
    s3_client: &S3Client,
    logs_client: &CloudWatchLogsClient,
    event: LambdaEvent<S3Event>,
) -> Result<Vec<SubmissionResult>, Error> {
    let config = ForwarderConfig::from_env()?;
    process_event(s3_client, logs_client, &config, &event.payload).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = ForwarderConfig::from_env()?;
    let s3_client = create_s3_client(None).await;
    let logs_client = create_cloudwatch_logs_client(config.region.as_deref(), None).await;

    run(service_fn(|event: LambdaEvent<S3Event>| {
        function_handler(&s3_client, &logs_client, event)
    }))
    .await
}
