use hotelauth::TokenStore;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, error, warn};

//--------------------------------------------------------------------------------------------------
// Token slot kept in a file between invocations
//--------------------------------------------------------------------------------------------------

/// IO failures are logged and the slot is treated as empty, so a broken file never stops the
/// client from signing in again.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!("Could not read token from {}: {}", self.path.display(), err);
                None
            }
        }
    }

    fn set(&self, token: String) {
        match fs::write(&self.path, token) {
            Ok(()) => debug!("Token written to {}", self.path.display()),
            Err(err) => error!("Could not write token to {}: {}", self.path.display(), err),
        }
    }

    fn remove(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Token file {} removed", self.path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => error!("Could not remove {}: {}", self.path.display(), err),
        }
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
