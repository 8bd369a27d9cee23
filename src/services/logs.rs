//! Log export jobs
//!
//! Copies the lines of one day out of the application log into a separate
//! file, in the background. Callers poll the job by task id and download the
//! extract once it has completed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::fs;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{CatalogError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Interval at which [`LogExporter::collect`] checks on its job
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Completed,
    Failed,
}

/// State of one export job, as served by GET /api/logs/status/:id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogTask {
    pub status: TaskStatus,
    pub file_path: Option<String>,
    pub error_message: Option<String>,
}

impl LogTask {
    fn pending() -> Self {
        Self {
            status: TaskStatus::Pending,
            file_path: None,
            error_message: None,
        }
    }

    fn completed(path: &Path) -> Self {
        Self {
            status: TaskStatus::Completed,
            file_path: Some(path.display().to_string()),
            error_message: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            status: TaskStatus::Failed,
            file_path: None,
            error_message: Some(message),
        }
    }
}

// == Log Exporter ==
#[derive(Debug)]
pub struct LogExporter {
    tasks: Arc<Mutex<HashMap<String, LogTask>>>,
    source: PathBuf,
    export_dir: PathBuf,
    delay: Duration,
}

impl LogExporter {
    pub fn new(
        source: impl Into<PathBuf>,
        export_dir: impl Into<PathBuf>,
        delay: Duration,
    ) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(HashMap::new())),
            source: source.into(),
            export_dir: export_dir.into(),
            delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.log_file,
            &config.log_export_dir,
            config.log_export_delay(),
        )
    }

    /// Starts an export of the lines logged on `date` and returns its task id.
    ///
    /// The date is checked up front; problems with the log itself are only
    /// reported through the task status.
    pub fn start(&self, date: &str) -> Result<String> {
        parse_date(date)?;

        let task_id = Uuid::new_v4().to_string();
        self.tasks.lock().insert(task_id.clone(), LogTask::pending());
        info!("Starting log file creation for date: {}, taskId: {}", date, task_id);

        let tasks = self.tasks.clone();
        let source = self.source.clone();
        let export_dir = self.export_dir.clone();
        let delay = self.delay;
        let date = date.to_string();
        let id = task_id.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let outcome = match extract(&source, &export_dir, &date, &id).await {
                Ok(path) => {
                    info!("Log file created: {}", path.display());
                    LogTask::completed(&path)
                }
                Err(err) => {
                    error!("Log file creation failed for taskId {}: {:#}", id, err);
                    LogTask::failed(format!("{:#}", err))
                }
            };
            tasks.lock().insert(id, outcome);
        });

        Ok(task_id)
    }

    pub fn status(&self, task_id: &str) -> Result<LogTask> {
        self.tasks
            .lock()
            .get(task_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Task ID not found: {}", task_id)))
    }

    fn file_path(&self, task_id: &str) -> Result<PathBuf> {
        match self.status(task_id)? {
            LogTask {
                status: TaskStatus::Completed,
                file_path: Some(path),
                ..
            } => Ok(PathBuf::from(path)),
            _ => Err(CatalogError::NotFound(format!(
                "Log file not available for task ID: {}",
                task_id
            ))),
        }
    }

    /// Reads a completed extract and deletes it from disk.
    ///
    /// A second call for the same task reports the file as missing.
    pub async fn take_file(&self, task_id: &str) -> Result<Vec<u8>> {
        let path = self.file_path(task_id)?;
        let bytes = fs::read(&path).await.map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => CatalogError::NotFound(format!(
                "Log file not found for task ID: {}",
                task_id
            )),
            _ => CatalogError::Internal(format!("Failed to read log file: {}", err)),
        })?;

        if let Err(err) = fs::remove_file(&path).await {
            warn!("Failed to delete {}: {}", path.display(), err);
        }
        debug!(task_id, bytes = bytes.len(), "Log file handed out");
        Ok(bytes)
    }

    /// Runs an export to completion and returns the extracted text.
    pub async fn collect(&self, date: &str) -> Result<String> {
        let task_id = self.start(date)?;

        loop {
            let task = self.status(&task_id)?;
            match task.status {
                TaskStatus::Pending => tokio::time::sleep(POLL_INTERVAL).await,
                TaskStatus::Completed => break,
                TaskStatus::Failed => {
                    return Err(CatalogError::Internal(format!(
                        "Log file creation failed: {}",
                        task.error_message.unwrap_or_default()
                    )))
                }
            }
        }

        let bytes = self.take_file(&task_id).await?;
        String::from_utf8(bytes)
            .map_err(|err| CatalogError::Internal(format!("Log file is not UTF-8: {}", err)))
    }
}

/// Accepts `yyyy-MM-dd` dates up to today (UTC, the clock of the log lines).
fn parse_date(date: &str) -> Result<NaiveDate> {
    let well_formed = date.len() == 10
        && date.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    let day = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .ok()
        .filter(|_| well_formed)
        .ok_or_else(|| {
            CatalogError::InvalidRequest("Date must be in yyyy-MM-dd format".to_string())
        })?;

    if day > Utc::now().date_naive() {
        return Err(CatalogError::InvalidRequest(
            "Date cannot be in the future".to_string(),
        ));
    }
    Ok(day)
}

/// Writes the lines of `source` starting with `date` to a new file in
/// `export_dir`.
async fn extract(
    source: &Path,
    export_dir: &Path,
    date: &str,
    task_id: &str,
) -> anyhow::Result<PathBuf> {
    let contents = fs::read_to_string(source)
        .await
        .with_context(|| format!("Log file not found: {}", source.display()))?;

    let lines: Vec<&str> = contents
        .lines()
        .filter(|line| line.starts_with(date))
        .collect();
    if lines.is_empty() {
        anyhow::bail!("No log entries found for date: {}", date);
    }

    fs::create_dir_all(export_dir)
        .await
        .with_context(|| format!("Cannot create {}", export_dir.display()))?;
    let path = export_dir.join(format!("{}_{}.log", date, task_id));
    debug!("Writing logs to file: {}", path.display());
    fs::write(&path, lines.join("\n"))
        .await
        .with_context(|| format!("Cannot write {}", path.display()))?;
    Ok(path)
}
