use crate::error::ForwarderError;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_cloudwatchlogs::Client as CloudWatchLogsClient;
use std::env;

pub const LOG_GROUP_NAME: &str = "LOG_GROUP_NAME";
pub const LOG_GROUP_REGION: &str = "LOG_GROUP_REGION";
pub const LOG_SOURCE_NAME: &str = "LOG_SOURCE_NAME";

/// Tag written into the `name` field of every forwarded message
pub const DEFAULT_SOURCE_NAME: &str = "logs:cloudfront";

const DEFAULT_REGION: &str = "eu-west-2";

/// # Where forwarded events are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderConfig {
    pub log_group_name: String,
    pub region: Option<String>,
    pub source_name: String,
}

impl ForwarderConfig {
    pub fn new(log_group_name: impl Into<String>) -> Self {
        ForwarderConfig {
            log_group_name: log_group_name.into(),
            region: None,
            source_name: DEFAULT_SOURCE_NAME.to_string(),
        }
    }

    /// # Reads the configuration from the environment
    ///
    /// `LOG_GROUP_NAME` is required. `LOG_GROUP_REGION` and `LOG_SOURCE_NAME` are optional.
    pub fn from_env() -> Result<Self, ForwarderError> {
        let log_group_name =
            env::var(LOG_GROUP_NAME).map_err(|source| ForwarderError::MissingEnvironmentVariable {
                name: LOG_GROUP_NAME,
                source,
            })?;
        let region = env::var(LOG_GROUP_REGION)
            .ok()
            .filter(|region| !region.is_empty());
        let source_name = env::var(LOG_SOURCE_NAME)
            .ok()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string());
        Ok(ForwarderConfig {
            log_group_name,
            region,
            source_name,
        })
    }
}

/// # Creates an AWS SDK config object
///
/// The region falls back to the default provider chain and then to `eu-west-2`.
/// Retries are disabled, a failed call fails the whole invocation.
pub async fn aws_config(
    region: Option<&str>,
    potential_endpoint_url: Option<&str>,
) -> SdkConfig {
    let region_provider = RegionProviderChain::first_try(region.map(|r| Region::new(r.to_owned())))
        .or_default_provider()
        .or_else(DEFAULT_REGION);

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .retry_config(RetryConfig::disabled());
    if let Some(endpoint_url) = potential_endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    loader.load().await
}

/// # Creates a CloudWatch Logs client
pub async fn create_cloudwatch_logs_client(
    region: Option<&str>,
    potential_endpoint_url: Option<&str>,
) -> CloudWatchLogsClient {
    let config = aws_config(region, potential_endpoint_url).await;
    CloudWatchLogsClient::new(&config)
}
