use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::output::write_atomic;
use crate::version::detector::StateStore;
use crate::version::error::PersistenceError;

/// Last reported version kept in a one-line text file
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let value = content.trim();
                Ok((!value.is_empty()).then(|| value.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file at {:?}", self.path);
                Ok(None)
            }
            Err(source) => Err(PersistenceError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&self, version: &str) -> Result<(), PersistenceError> {
        write_atomic(&self.path, format!("{}\n", version).as_bytes())
    }
}
