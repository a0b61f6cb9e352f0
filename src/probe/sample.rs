//! Fixed probe input.
//!
//! The sample file is a JSON list of feature records, e.g.
//! `[{"total_sqft": 1000.0, "bath": 2.0, "bhk": 3.0}]`.
//! There is no built-in fallback: a missing or malformed file fails the tick.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Feature records sent by the probe, read-only once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SampleInput(pub Vec<Map<String, Value>>);

impl SampleInput {
    /// JSON payload sent to the backend.
    pub fn to_payload(&self) -> Value {
        Value::Array(self.0.iter().cloned().map(Value::Object).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum SampleLoadError {
    #[error("sample input {0} not found")]
    Missing(PathBuf),

    #[error("failed to read sample input {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("sample input {path} is not a JSON list of records: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("sample input {0} contains no records")]
    Empty(PathBuf),
}

/// Read and parse a sample file.
pub async fn load_sample(path: &Path) -> Result<SampleInput, SampleLoadError> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SampleLoadError::Missing(path.to_path_buf()))
        }
        Err(source) => {
            return Err(SampleLoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let sample: SampleInput =
        serde_json::from_slice(&content).map_err(|source| SampleLoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    if sample.is_empty() {
        return Err(SampleLoadError::Empty(path.to_path_buf()));
    }
    Ok(sample)
}

/// Lazily loaded sample, cached after the first successful read.
///
/// Readers get an `Arc` snapshot of the first successfully loaded sample.
pub struct SampleStore {
    path: PathBuf,
    cached: ArcSwapOption<SampleInput>,
}

impl SampleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: ArcSwapOption::const_empty(),
        }
    }

    /// Cached sample, loading it first if nothing is cached yet.
    pub async fn get(&self) -> Result<Arc<SampleInput>, SampleLoadError> {
        if let Some(sample) = self.cached.load_full() {
            return Ok(sample);
        }

        let sample = Arc::new(load_sample(&self.path).await?);
        tracing::info!(path = %self.path.display(), records = sample.len(), "Loaded sample input");
        self.cached.store(Some(sample.clone()));
        Ok(sample)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_file(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sample-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn loads_records() {
        let path = temp_file(r#"[{"total_sqft": 1000.0, "bath": 2.0, "bhk": 3.0}]"#);
        let sample = load_sample(&path).await.unwrap();
        assert_eq!(sample.len(), 1);
        assert_eq!(
            sample.to_payload(),
            json!([{"total_sqft": 1000.0, "bath": 2.0, "bhk": 3.0}])
        );
        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn classifies_failures() {
        let missing = std::env::temp_dir().join("definitely-not-here.json");
        assert!(matches!(load_sample(&missing).await, Err(SampleLoadError::Missing(_))));

        let malformed = temp_file("{not json");
        assert!(matches!(
            load_sample(&malformed).await,
            Err(SampleLoadError::Malformed { .. })
        ));

        let object = temp_file(r#"{"total_sqft": 1000.0}"#);
        assert!(matches!(
            load_sample(&object).await,
            Err(SampleLoadError::Malformed { .. })
        ));

        let empty = temp_file("[]");
        assert!(matches!(load_sample(&empty).await, Err(SampleLoadError::Empty(_))));

        for path in [malformed, object, empty] {
            std::fs::remove_file(path).unwrap();
        }
    }

    #[tokio::test]
    async fn store_retries_after_failure_and_caches_success() {
        let path = std::env::temp_dir().join(format!("sample-{}.json", uuid::Uuid::new_v4()));
        let store = SampleStore::new(&path);

        assert!(store.get().await.is_err());

        std::fs::write(&path, r#"[{"bath": 2.0}]"#).unwrap();
        let first = store.get().await.unwrap();

        std::fs::write(&path, r#"[{"bath": 3.0}]"#).unwrap();
        let second = store.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        assert_eq!(second.to_payload(), json!([{"bath": 2.0}]));

        let fresh = SampleStore::new(&path).get().await.unwrap();
        assert_eq!(fresh.to_payload(), json!([{"bath": 3.0}]));

        std::fs::remove_file(path).unwrap();
    }
}
