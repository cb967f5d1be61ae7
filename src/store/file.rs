use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use log::info;

use super::{RawCatalog, SessionStore};
use crate::RacewatchError;
use crate::session::RawSessionRecord;

/// Session store read from a JSON export of the `races` tree.
///
/// The file is re-read on every fetch so a recorder appending to it shows up like a remote store
/// would.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Result<Self, RacewatchError> {
        if !path.is_file() {
            return Err(RacewatchError::InvalidUserInput {
                field: "input".to_string(),
                reason: format!("{:?} is not a file", path),
            });
        }
        Ok(Self { path })
    }

    fn read(&self) -> Result<RawCatalog, RacewatchError> {
        let file = File::open(&self.path).map_err(|e| RacewatchError::StoreFileError {
            path: self.path.clone(),
            source: e,
        })?;
        let races: Option<RawCatalog> = serde_json::from_reader(BufReader::new(file)).map_err(
            |e| RacewatchError::MalformedResponse {
                url: self.path.display().to_string(),
                source: e,
            },
        )?;
        Ok(races.unwrap_or_default())
    }
}

impl SessionStore for FileSessionStore {
    fn fetch_all(&self) -> Result<RawCatalog, RacewatchError> {
        let races = self.read()?;
        info!("Loaded {} sessions from {:?}", races.len(), self.path);
        Ok(races)
    }

    fn fetch_session(&self, id: &str) -> Result<Option<RawSessionRecord>, RacewatchError> {
        Ok(self.read()?.remove(id))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
