//! Source-model reader seam.
//!
//! Parsing source-model files is done elsewhere; the samplers only need
//! something that turns an input-model reference into a source list.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::types::source::SeismicSource;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Source model not found: {0}")]
    NotFound(String),

    #[error("Failed to read source model {path}: {message}")]
    Invalid { path: String, message: String },
}

/// Loads the ordered source list of a source model.
pub trait SourceModelReader: Sync {
    fn load(&self, path: &Path, mfd_bin_width: f64) -> Result<Vec<SeismicSource>, ReaderError>;
}

/// Reader over source models already resident in memory, keyed by path.
///
/// Every call returns a fresh copy so callers can never alias one another's
/// sources.
#[derive(Debug, Clone, Default)]
pub struct InMemorySourceModelReader {
    models: HashMap<String, Vec<SeismicSource>>,
}

impl InMemorySourceModelReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, sources: Vec<SeismicSource>) {
        self.models.insert(path.into(), sources);
    }

    /// Build a reader from a JSON object mapping path to source list.
    pub fn from_json(json: &str) -> Result<Self, ReaderError> {
        let models: HashMap<String, Vec<SeismicSource>> =
            serde_json::from_str(json).map_err(|e| ReaderError::Invalid {
                path: "<json>".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { models })
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl SourceModelReader for InMemorySourceModelReader {
    fn load(&self, path: &Path, _mfd_bin_width: f64) -> Result<Vec<SeismicSource>, ReaderError> {
        let key = path.to_string_lossy();
        self.models
            .get(key.as_ref())
            .cloned()
            .ok_or_else(|| ReaderError::NotFound(key.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model() {
        let reader = InMemorySourceModelReader::new();
        assert!(matches!(
            reader.load(Path::new("nope.xml"), 0.1),
            Err(ReaderError::NotFound(p)) if p == "nope.xml"
        ));
    }

    #[test]
    fn test_from_json() {
        let reader = InMemorySourceModelReader::from_json(r#"{"empty.xml": []}"#).unwrap();
        assert_eq!(reader.len(), 1);
        assert!(reader.load(Path::new("empty.xml"), 0.1).unwrap().is_empty());
        assert!(InMemorySourceModelReader::from_json("[").is_err());
    }
}
