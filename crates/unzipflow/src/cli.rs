use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use unzipflow::InvocationRequest;
use unzipflow_notify::Correlation;

#[derive(Debug, Parser)]
#[command(name = "unzipflow", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(name = "run", about = "Extract an archive, upload its files and notify a topic")]
    Run(RunArg),
    #[command(alias = "cfg", name = "config", about = "Print the effective settings")]
    Config(ConfigArg),
}

#[derive(Debug, Args)]
pub struct ConfigArg {
    /// Settings file (TOML)
    #[arg(long, short, env = "UNZIPFLOW_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RunArg {
    /// Settings file (TOML)
    #[arg(long, short, env = "UNZIPFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Messaging namespace endpoint, overriding `messaging.namespace`
    #[arg(long, env = "UNZIPFLOW_MESSAGING_NAMESPACE")]
    pub namespace: Option<String>,

    /// Invocation request as a JSON file, instead of the individual flags
    #[arg(long, short)]
    pub request: Option<PathBuf>,

    #[command(flatten)]
    pub fields: RequestFields,
}

#[derive(Debug, Args)]
pub struct RequestFields {
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    pub source_blob_url: Option<String>,
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    pub destination_blob_url: Option<String>,
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    pub source_container_name: Option<String>,
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    pub destination_container_name: Option<String>,
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    pub source_blob_name: Option<String>,
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    pub destination_folder_name: Option<String>,
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    pub topic_name: Option<String>,
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    pub correlation_id: Option<String>,
    #[arg(long = "int-id", required_unless_present = "request", conflicts_with = "request")]
    pub integration_id: Option<String>,
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    pub event_type: Option<String>,
    #[arg(long, required_unless_present = "request", conflicts_with = "request")]
    pub zip_file_name: Option<String>,
}

fn required(value: Option<String>, flag: &str) -> anyhow::Result<String> {
    value.with_context(|| format!("--{flag} is required"))
}

impl RequestFields {
    pub fn into_request(self) -> anyhow::Result<InvocationRequest> {
        Ok(InvocationRequest {
            source_blob_url: required(self.source_blob_url, "source-blob-url")?,
            destination_blob_url: required(self.destination_blob_url, "destination-blob-url")?,
            source_container_name: required(self.source_container_name, "source-container-name")?,
            destination_container_name: required(
                self.destination_container_name,
                "destination-container-name",
            )?,
            source_blob_name: required(self.source_blob_name, "source-blob-name")?,
            destination_folder_name: required(
                self.destination_folder_name,
                "destination-folder-name",
            )?,
            topic_name: required(self.topic_name, "topic-name")?,
            correlation: Correlation {
                correlation_id: required(self.correlation_id, "correlation-id")?,
                integration_id: required(self.integration_id, "int-id")?,
                event_type: required(self.event_type, "event-type")?,
                archive_file_name: required(self.zip_file_name, "zip-file-name")?,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }

    #[test]
    fn flags_build_a_request() {
        let app = App::try_parse_from([
            "unzipflow",
            "run",
            "--source-blob-url",
            "https://src.blob.example",
            "--destination-blob-url",
            "https://dst.blob.example",
            "--source-container-name",
            "incoming",
            "--destination-container-name",
            "extracted",
            "--source-blob-name",
            "batch.zip",
            "--destination-folder-name",
            "drop",
            "--topic-name",
            "extracted-files",
            "--correlation-id",
            "corr-1",
            "--int-id",
            "INT-42",
            "--event-type",
            "ShipmentFiles",
            "--zip-file-name",
            "batch.zip",
        ])
        .unwrap();
        let Commands::Run(arg) = app.cmd else {
            panic!("expected run");
        };
        let request = arg.fields.into_request().unwrap();
        assert_eq!(request.destination_folder_name, "drop");
        assert_eq!(request.correlation.integration_id, "INT-42");
    }

    #[test]
    fn request_file_replaces_flags() {
        let app = App::try_parse_from(["unzipflow", "run", "--request", "req.json"]).unwrap();
        let Commands::Run(arg) = app.cmd else {
            panic!("expected run");
        };
        assert_eq!(arg.request, Some(PathBuf::from("req.json")));
    }

    #[test]
    fn missing_flags_are_rejected() {
        assert!(App::try_parse_from(["unzipflow", "run", "--topic-name", "t"]).is_err());
    }
}
