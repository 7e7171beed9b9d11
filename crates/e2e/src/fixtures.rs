//! Static JSON fixtures
//!
//! Each fixture file maps a scenario name to a payload:
//!
//! ```json
//! { "longTitle": { "title": "LONG_TITLE_PLACEHOLDER", "description": "..." } }
//! ```

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{E2eError, E2eResult};

pub const INVALID_USER_DATA: &str = "invalidUserData.json";
pub const INVALID_NOTE_DATA: &str = "invalidNoteData.json";
pub const INVALID_API_DATA: &str = "invalidApiData.json";
pub const NOTE_DATA: &str = "noteData.json";

/// Reads fixture files from one directory
#[derive(Debug, Clone)]
pub struct FixtureStore {
    dir: PathBuf,
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl FixtureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The fixtures shipped with this crate
    pub fn default_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a whole fixture file. It must hold a JSON object.
    pub fn load(&self, name: &str) -> E2eResult<Value> {
        let content = std::fs::read_to_string(self.dir.join(name))?;
        let value: Value = serde_json::from_str(&content)?;
        if !value.is_object() {
            return Err(E2eError::FixtureShape(name.to_string()));
        }
        Ok(value)
    }

    /// Load one named entry from a fixture file
    pub fn entry(&self, name: &str, key: &str) -> E2eResult<Value> {
        self.load(name)?
            .get(key)
            .cloned()
            .ok_or_else(|| E2eError::FixtureNotFound {
                fixture: name.to_string(),
                key: key.to_string(),
            })
    }
}
