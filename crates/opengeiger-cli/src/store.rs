//! File-backed parameter persistence.
//!
//! The device keeps one opaque parameter block; the simulator stores it
//! as a small JSON file so runs survive restarts and the file stays
//! inspectable by hand.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use opengeiger_session::{ParamStore, SessionError, SessionResult};

/// Upper bound on the stored blob, matching a small EEPROM.
const MAX_PARAM_BYTES: usize = 64;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredParams {
    params: Vec<u8>,
}

/// JSON-file parameter store.
#[derive(Debug)]
pub struct FileParamStore {
    path: PathBuf,
}

impl FileParamStore {
    /// Binds the store to `path`; the file is created on first write.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ParamStore for FileParamStore {
    fn load(&mut self) -> SessionResult<Vec<u8>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)
            .map_err(|err| SessionError::persistence(err.to_string()))?;
        let stored: StoredParams = serde_json::from_str(&text)
            .map_err(|err| SessionError::persistence(err.to_string()))?;
        Ok(stored.params)
    }

    fn store(&mut self, params: &[u8]) -> SessionResult<()> {
        if params.len() > MAX_PARAM_BYTES {
            return Err(SessionError::persistence(format!(
                "parameter block of {} bytes exceeds the {MAX_PARAM_BYTES} byte store",
                params.len()
            )));
        }
        let stored = StoredParams {
            params: params.to_vec(),
        };
        let text = serde_json::to_string_pretty(&stored)
            .map_err(|err| SessionError::persistence(err.to_string()))?;
        fs::write(&self.path, text).map_err(|err| SessionError::persistence(err.to_string()))
    }
}
