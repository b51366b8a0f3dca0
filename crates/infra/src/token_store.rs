//! File-backed token store
//!
//! One JSON file per key, named `MailUp.{key}`, in a cache directory. The
//! directory is checked once when the store is opened; an unusable directory
//! disables persistence instead of failing.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use mailup_core::{CachedToken, TokenStore};
use mailup_domain::{MailUpError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::infra;

const FILE_PREFIX: &str = "MailUp.";

#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    value: String,
    obtained_at: i64,
}

/// [`TokenStore`] keeping each token in its own file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Open a store in `dir`.
    ///
    /// Returns `None` when `dir` is not an existing, writable directory.
    pub fn open(dir: impl AsRef<Path>) -> Option<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "Token cache directory does not exist, persistence disabled");
            return None;
        }
        if !is_writable(dir) {
            warn!(dir = %dir.display(), "Token cache directory is not writable, persistence disabled");
            return None;
        }
        debug!(dir = %dir.display(), "Token cache directory ready");
        Some(Self { dir: dir.to_path_buf() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the token stored under `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{key}"))
    }
}

fn is_writable(dir: &Path) -> bool {
    let marker = dir.join(format!(".{FILE_PREFIX}write-check-{}", std::process::id()));
    match OpenOptions::new().write(true).create(true).truncate(true).open(&marker) {
        Ok(_) => {
            let _ = fs::remove_file(&marker);
            true
        }
        Err(_) => false,
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> Result<Option<CachedToken>> {
        let contents = match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(infra(err)),
        };

        let record: TokenRecord = serde_json::from_str(&contents).map_err(|e| {
            MailUpError::MalformedReply(format!("Corrupt token cache record {key}: {e}"))
        })?;
        Ok(Some(CachedToken { value: record.value, obtained_at: record.obtained_at }))
    }

    fn save(&self, key: &str, token: &CachedToken) -> Result<()> {
        let record = TokenRecord { value: token.value.clone(), obtained_at: token.obtained_at };
        let contents = serde_json::to_string(&record).map_err(infra)?;
        fs::write(self.path_for(key), contents).map_err(infra)
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(infra(err)),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }
}
