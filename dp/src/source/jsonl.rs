//! Lesson sink that appends committed records to a JSON-lines file

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use super::{LessonRecord, LessonRecordRequest, LessonRecordSink, SourceError};
use crate::domain::{RecordId, generate_id};

/// Appends one JSON object per created lesson record
#[derive(Debug)]
pub struct JsonlLessonSink {
    path: PathBuf,
    /// Serializes appends from concurrent commits
    write_lock: Mutex<()>,
}

impl JsonlLessonSink {
    /// Create a sink writing to `path`, creating parent directories
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "JsonlLessonSink::open: called");
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every record written so far
    pub async fn read_all(&self) -> Result<Vec<LessonRecord>, SourceError> {
        debug!(path = %self.path.display(), "JsonlLessonSink::read_all: called");
        if !fs::try_exists(&self.path).await? {
            debug!("JsonlLessonSink::read_all: file does not exist");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).await?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| SourceError::Parse(e.to_string())))
            .collect()
    }
}

#[async_trait]
impl LessonRecordSink for JsonlLessonSink {
    async fn create(&self, request: LessonRecordRequest) -> Result<RecordId, SourceError> {
        debug!(topic = %request.topic_label, "JsonlLessonSink::create: called");
        let _guard = self.write_lock.lock().await;

        let record = LessonRecord {
            id: RecordId::from(generate_id("lesson", &request.topic_label)),
            request,
        };
        let line = serde_json::to_string(&record).map_err(|e| SourceError::Parse(e.to_string()))? + "\n";

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(id = %record.id, "JsonlLessonSink::create: record written");
        Ok(record.id)
    }
}
