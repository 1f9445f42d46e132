//! The single status record returned to the host.

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::RunError;
use crate::pipeline::Pipeline;
use crate::request::InvocationRequest;

pub const STARTING: &str = "Starting the file unzip process.";
pub const SUCCEEDED: &str = "Files unzipped and uploaded to destination blob successfully.";
const ERROR_PREFIX: &str = "Error: ";

/// Serialized as `{"CurrentTaskStatus": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(rename = "CurrentTaskStatus")]
    pub current_task_status: String,
}

impl TaskStatus {
    pub fn starting() -> Self {
        Self {
            current_task_status: STARTING.to_string(),
        }
    }

    fn succeeded(&mut self) {
        self.current_task_status = SUCCEEDED.to_string();
    }

    fn failed(&mut self, error: &RunError) {
        self.current_task_status = format!("{ERROR_PREFIX}{error}");
    }

    pub fn is_error(&self) -> bool {
        self.current_task_status.starts_with(ERROR_PREFIX)
    }

    pub fn message(&self) -> &str {
        &self.current_task_status
    }
}

/// Run the pipeline and fold its outcome into a status record.
///
/// Never fails: every error becomes an `Error: ...` status. Nothing is
/// retried.
pub async fn invoke(pipeline: &Pipeline, request: &InvocationRequest) -> TaskStatus {
    let mut status = TaskStatus::starting();
    info!(
        source = %request.source_blob_name,
        topic = %request.topic_name,
        "{}",
        status.message()
    );

    match pipeline.run(request).await {
        Ok(report) => {
            info!(published = report.published.len(), "run succeeded");
            status.succeeded();
        }
        Err(e) => {
            error!(kind = %e.kind(), error = %e, "run failed");
            status.failed(&e);
        }
    }
    status
}
