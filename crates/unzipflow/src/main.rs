use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use unzipflow::config::LogSettings;
use unzipflow::{InvocationRequest, Pipeline, PipelineOptions, Settings};
use unzipflow_identity::DefaultCredential;
use unzipflow_notify::TopicRestConnector;
use unzipflow_store::BlobRestConnector;

use crate::cli::{App, Commands, ConfigArg, RunArg};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::parse();
    match app.cmd {
        Commands::Run(arg) => run(arg).await,
        Commands::Config(arg) => show_config(arg),
    }
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(arg: RunArg) -> anyhow::Result<()> {
    let settings = Settings::load(arg.config.as_deref())?;
    init_tracing(&settings.log);

    let request = match &arg.request {
        Some(path) => {
            let json = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read request file '{}'", path.display()))?;
            InvocationRequest::from_json(&json)
                .with_context(|| format!("invalid request file '{}'", path.display()))?
        }
        None => arg.fields.into_request()?,
    };

    let namespace = arg
        .namespace
        .or(settings.messaging.namespace)
        .context("no messaging namespace: set messaging.namespace or --namespace")?;

    let storage = Arc::new(BlobRestConnector::new(&settings.storage.api_version)?);
    let messaging = Arc::new(TopicRestConnector::new(&namespace)?);
    let credential = DefaultCredential::acquire(&settings.credential.token_env);

    let pipeline = Pipeline::new(storage, messaging, credential).with_options(PipelineOptions {
        chunk_size: settings.upload.chunk_size,
    });
    let status = unzipflow::invoke(&pipeline, &request).await;

    println!("{}", serde_json::to_string(&status)?);
    Ok(())
}

fn show_config(arg: ConfigArg) -> anyhow::Result<()> {
    let settings = Settings::load(arg.config.as_deref())?;
    print!("{}", toml::to_string_pretty(&settings)?);
    Ok(())
}
