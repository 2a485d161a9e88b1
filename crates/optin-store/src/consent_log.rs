//! Consent Log
//!
//! Append-only persistence for consent records. The JSON-file backend is
//! an explicit placeholder for a durable store with atomic appends: it
//! reads the whole collection, appends, and writes the whole collection
//! back, which loses updates under concurrent writers.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::RwLock;

use optin_core::ConsentRecord;

use crate::error::Result;

/// Append-only consent record log
#[async_trait]
pub trait ConsentLog: Send + Sync {
    /// Append one record. Records are never mutated or deleted through
    /// this interface.
    async fn append(&self, record: &ConsentRecord) -> Result<()>;

    /// Read the full collection, oldest first
    async fn all(&self) -> Result<Vec<ConsentRecord>>;
}

/// Consent log backed by a single JSON array on disk
pub struct JsonFileConsentLog {
    path: PathBuf,
}

impl JsonFileConsentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Missing file or malformed content both read as an empty
    /// collection, so a corrupted log never blocks new opt-ins.
    async fn read_collection(&self) -> Vec<ConsentRecord> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "Consent log unreadable, starting empty");
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl ConsentLog for JsonFileConsentLog {
    async fn append(&self, record: &ConsentRecord) -> Result<()> {
        let mut records = self.read_collection().await;
        records.push(record.clone());

        let encoded = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, encoded).await?;

        Ok(())
    }

    async fn all(&self) -> Result<Vec<ConsentRecord>> {
        Ok(self.read_collection().await)
    }
}

/// In-memory consent log (for development and tests)
#[derive(Default)]
pub struct MemoryConsentLog {
    records: RwLock<Vec<ConsentRecord>>,
}

impl MemoryConsentLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConsentLog for MemoryConsentLog {
    async fn append(&self, record: &ConsentRecord) -> Result<()> {
        self.records.write().unwrap().push(record.clone());
        Ok(())
    }

    async fn all(&self) -> Result<Vec<ConsentRecord>> {
        Ok(self.records.read().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use optin_core::OptInSubmission;

    fn sample_record(name: &str) -> ConsentRecord {
        let submission = OptInSubmission {
            name: name.into(),
            phone_e164: "+14155551234".into(),
            tz_iana: "UTC".into(),
            consent_version: Some("v1".into()),
            web_form_shown_copy: Some("shown copy".into()),
            ..OptInSubmission::default()
        };
        ConsentRecord::build(submission, "203.0.113.9".into(), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_memory_log_appends_in_order() {
        let log = MemoryConsentLog::new();
        log.append(&sample_record("First User")).await.unwrap();
        log.append(&sample_record("Second User")).await.unwrap();

        let all = log.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "First User");
        assert_eq!(all[1].name, "Second User");
    }

    #[tokio::test]
    async fn test_file_log_roundtrip() {
        let path = std::env::temp_dir().join(format!("consent_log_{}.json", uuid::Uuid::new_v4()));
        let log = JsonFileConsentLog::new(&path);

        log.append(&sample_record("Ada Lovelace")).await.unwrap();
        log.append(&sample_record("Grace Hopper")).await.unwrap();

        let all = log.all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].name, "Grace Hopper");
        assert_eq!(all[0].phone_e164, "+14155551234");

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_log_treats_garbage_as_empty() {
        let path = std::env::temp_dir().join(format!("consent_log_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "{not json").await.unwrap();

        let log = JsonFileConsentLog::new(&path);
        assert!(log.all().await.unwrap().is_empty());

        log.append(&sample_record("Ada Lovelace")).await.unwrap();
        assert_eq!(log.all().await.unwrap().len(), 1);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_log_missing_file_reads_empty() {
        let path = std::env::temp_dir().join(format!("consent_log_{}.json", uuid::Uuid::new_v4()));
        let log = JsonFileConsentLog::new(&path);
        assert!(log.all().await.unwrap().is_empty());
    }
}
