use crate::model::Entry;
use anyhow::Result;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name of the single persistence slot holding the favorites array.
pub const FAVORITES_SLOT: &str = "favorites";

#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
}

impl FavoritesStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Store backed by `<dir>/favorites.json`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", FAVORITES_SLOT)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when the slot is missing or does not parse.
    pub fn load(&self) -> Option<Vec<Entry>> {
        if !self.path.exists() {
            return None;
        }
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not read favorites");
                return None;
            }
        };
        match serde_json::from_str::<Vec<Entry>>(&json) {
            Ok(favs) => Some(favs),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unparseable favorites");
                None
            }
        }
    }

    pub fn save(&self, favs: &[Entry]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        with_lock(&self.path, || {
            let json = serde_json::to_string_pretty(favs)?;
            atomic_write(&self.path, json)
        })
    }
}

/// Atomic write: Write to .tmp file then rename
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
    let path = path.as_ref();
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}

/// Runs `f` while holding an exclusive lock on `<path>.lock`.
pub fn with_lock<T, F>(path: &Path, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let lock_path = path.with_extension("lock");
    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)?;
    lock_file.lock_exclusive()?;
    let result = f();
    let _ = FileExt::unlock(&lock_file);
    result
}
