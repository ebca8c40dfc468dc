//!## Log forwarder script
//!
//! This is a script to be used to forward CloudFront log files on the local disk to CloudWatch Logs.
//!
//! ## Running
//! ```bash
//! log-forwarder --input /path/to/logs --log-group cloudfront-access-logs
//! ```
//!
//! ## Running against a local endpoint
//! ```bash
//! log-forwarder --input /path/to/logs --log-group test --region eu-west-2 --endpoint-url http://localhost:4566
//! ```
//!
//! The input path must only contain CloudFront log files, either gzipped (`.gz`) or plain text.
//! AWS credentials are read from the usual environment variables and profiles.
//!
use clap::Parser;
use log::{self, LevelFilter};
use log_forwarder_lib::*;
use simple_logger::SimpleLogger;
use std::fs::{self, DirEntry};
use std::path::{Path, PathBuf};
use std::process::exit;

/// # A struct representing the input arguments
#[derive(Parser)]
#[clap(name = "log-forwarder")]
struct Opt {
    /// Input folder
    #[clap(long, short, value_parser)]
    input: String,

    /// Destination log group
    #[clap(long, short, value_parser)]
    log_group: String,

    /// Region of the log group
    #[clap(long, short, value_parser)]
    region: Option<String>,

    /// Override the CloudWatch Logs endpoint
    #[clap(long, value_parser)]
    endpoint_url: Option<String>,

    /// Value of the `name` field added to every message
    #[clap(long, value_parser, default_value = config::DEFAULT_SOURCE_NAME)]
    source_name: String,
}

impl Opt {
    fn forwarder_config(&self) -> ForwarderConfig {
        ForwarderConfig {
            log_group_name: self.log_group.clone(),
            region: self.region.clone(),
            source_name: self.source_name.clone(),
        }
    }
}

/// # Helper function to check if a file does not start with `.`
fn is_not_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|file_name| !file_name.starts_with('.'))
        .unwrap_or(false)
}

/// # Helper function to check if the entry is a file
fn is_file(entry: &DirEntry) -> bool {
    !entry.path().is_dir()
}

/// # List files in input directory
///
/// This returns the paths of all visible files on that level, sorted by name.
/// It will not recursively search subdirectories.
fn files_in_input_dir(directory_path: &Path) -> Result<Vec<PathBuf>, ForwarderError> {
    let mut path_list: Vec<PathBuf> = fs::read_dir(directory_path)?
        .filter_map(|e| {
            let entry: DirEntry = e.ok()?;
            if is_file(&entry) && is_not_hidden(&entry) {
                Some(entry.path())
            } else {
                None
            }
        })
        .collect();
    path_list.sort();
    Ok(path_list)
}

/// # Process the input arguments
///
/// Expands `~` and environment variables in the input folder and lists the files in it.
fn files_from_input_arguments(opt: &Opt) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let dir_input: PathBuf = PathBuf::from(shellexpand::full(&opt.input)?.to_string());
    Ok(files_in_input_dir(&dir_input)?)
}

/// # Forwards one log file
async fn forward_file(
    client: &CloudWatchLogsClient,
    config: &ForwarderConfig,
    file: &Path,
) -> Result<usize, ForwarderError> {
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let contents = decode_log_file(file_name, &fs::read(file)?)?;
    let records = parse_cloudfront_log(&contents)?;
    let results = put_log_events(client, config, records).await?;
    Ok(results.iter().map(|result| result.event_count).sum())
}

/// # The entrypoint for the log forwarder script
#[tokio::main]
async fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();
    let opt: Opt = Opt::parse();
    let files = match files_from_input_arguments(&opt) {
        Ok(files) => files,
        Err(err) => {
            log::error!("Error: {}", err);
            exit(1);
        }
    };
    let config = opt.forwarder_config();
    let client =
        create_cloudwatch_logs_client(opt.region.as_deref(), opt.endpoint_url.as_deref()).await;
    for file in files {
        match forward_file(&client, &config, &file).await {
            Ok(event_count) => {
                log::info!("Forwarded {} events from {}", event_count, file.display())
            }
            Err(err) => {
                log::error!("Error: {}", err);
                exit(1);
            }
        };
    }
}

#[cfg(test)]
mod test {
    use crate::{files_from_input_arguments, Opt};
    use assert_fs::TempDir;
    use std::fs::{create_dir, write};
    use std::path::{Path, PathBuf};

    fn opt(input: String) -> Opt {
        Opt {
            input,
            log_group: "test-log-group".to_string(),
            region: None,
            endpoint_url: None,
            source_name: "logs:cloudfront".to_string(),
        }
    }

    fn get_file_name(file_path: &Path) -> &str {
        file_path
            .file_name()
            .and_then(|file_name| file_name.to_str())
            .unwrap()
    }

    #[test]
    fn test_files_can_be_retrieved_from_input_arguments() {
        let input_dir = TempDir::new().unwrap();
        let test_file_names = ["file3.gz", "file1.gz", "file2.gz", ".hidden"];
        for file_name in test_file_names {
            write(input_dir.join(PathBuf::from(file_name)), "".as_bytes()).unwrap();
        }
        create_dir(input_dir.join("subdirectory")).unwrap();
        let input = input_dir.to_str().unwrap().to_string();

        let files = files_from_input_arguments(&opt(input)).unwrap();

        assert_eq!(files.len(), 3);
        assert_eq!(get_file_name(&files[0]), "file1.gz");
        assert_eq!(get_file_name(&files[1]), "file2.gz");
        assert_eq!(get_file_name(&files[2]), "file3.gz")
    }

    #[test]
    fn test_error_if_input_folder_is_missing() {
        let input_dir = TempDir::new().unwrap();
        let input = input_dir.join("missing").to_str().unwrap().to_string();

        assert!(files_from_input_arguments(&opt(input)).is_err());
    }
}
