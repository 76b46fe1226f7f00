//! Where trackdeck keeps its config file and rolling logs.

use crate::{APP_AUTHOR, APP_NAME, APP_QUALIFIER};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct AppDirs {
    config_dir: PathBuf,
    log_dir: PathBuf,
}

impl AppDirs {
    /// Per-user locations, e.g. `~/.config/trackdeck` on Linux. Logs go under
    /// the data directory, not next to the config.
    pub fn discover() -> Result<Self, DirsError> {
        ProjectDirs::from(APP_QUALIFIER, APP_AUTHOR, APP_NAME)
            .map(|project| Self::new(project.config_dir(), project.data_dir().join("logs")))
            .ok_or(DirsError::NoHomeDirectory)
    }

    /// Config and logs side by side under `root`. Used for `--config`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let logs = root.join("logs");
        Self::new(&root, logs)
    }

    fn new(config_dir: &Path, log_dir: PathBuf) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            log_dir,
        }
    }

    pub fn ensure_exists(&self) -> Result<(), DirsError> {
        [self.config_dir.as_path(), self.log_dir.as_path()]
            .into_iter()
            .try_for_each(create_dir)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

fn create_dir(dir: &Path) -> Result<(), DirsError> {
    fs::create_dir_all(dir).map_err(|source| DirsError::Create {
        path: dir.to_path_buf(),
        source,
    })
}

#[derive(Debug, Error)]
pub enum DirsError {
    #[error("no home directory to keep trackdeck files in")]
    NoHomeDirectory,
    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
}
