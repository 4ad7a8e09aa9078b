use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable overriding the catalog location
pub const DB_PATH_ENV: &str = "NADE_CATALOG_DB";

const DB_FILE_NAME: &str = "nades.db";

/// Runtime configuration for the catalog binary
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the catalog path: CLI flag, then environment, then the platform data dir
    pub fn resolve(cli_override: Option<PathBuf>) -> Result<Self> {
        Self::resolve_from(cli_override, std::env::var_os(DB_PATH_ENV))
    }

    /// An empty environment value counts as unset
    fn resolve_from(cli_override: Option<PathBuf>, env_value: Option<OsString>) -> Result<Self> {
        if let Some(db_path) = cli_override {
            return Ok(Self { db_path });
        }

        if let Some(path) = env_value.filter(|p| !p.is_empty()) {
            return Ok(Self {
                db_path: PathBuf::from(path),
            });
        }

        let proj_dirs = ProjectDirs::from("", "", "nade-catalog")
            .context("Could not determine data directory")?;

        Ok(Self {
            db_path: proj_dirs.data_dir().join(DB_FILE_NAME),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
