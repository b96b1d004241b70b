//! JSON dataset writer
//!
//! Writes the whole listing collection as one JSON array. Calendars are
//! objects keyed by `YYYY-MM-DD`; missing listing fields are `null`.

use crate::listing::Listing;
use crate::output::traits::{OutputError, OutputHandler, OutputResult};
use std::path::{Path, PathBuf};

/// Writes listings to a single JSON file
pub struct JsonOutputHandler {
    path: PathBuf,
}

impl JsonOutputHandler {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn write_error(&self, source: std::io::Error) -> OutputError {
        OutputError::Write {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl OutputHandler for JsonOutputHandler {
    fn write(&mut self, listings: &[Listing]) -> OutputResult<()> {
        let json = serde_json::to_string_pretty(listings)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        std::fs::write(&self.path, json).map_err(|e| self.write_error(e))?;

        tracing::info!("Wrote {} listings to {}", listings.len(), self.destination());
        Ok(())
    }

    fn destination(&self) -> String {
        self.path.display().to_string()
    }
}
