//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _, Result};
use atelier_commerce::catalog::{Catalog, ProductRef};
use atelier_commerce::session::StorefrontSession;
use atelier_commerce::timer::ManualScheduler;
use atelier_commerce::ProductId;
use atelier_storage::FileBackend;
use tracing::debug;

use crate::config::CliConfig;
use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["atelier.toml", ".atelier.toml", "atelier.json"];
const DEFAULT_DATA_DIR: &str = ".atelier";

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    data_dir: Option<PathBuf>,
}

/// A session plus the scheduler driving its price filter.
pub struct Shop {
    pub session: StorefrontSession,
    pub scheduler: ManualScheduler,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, data_dir: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = resolve(&cwd, Path::new(path));
                (CliConfig::load(&path)?, Some(path))
            }
            // Try to find config in current directory or parent directories
            None => match Self::find_config(&cwd) {
                Some((path, config)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            },
        };
        debug!(config = ?config_path, "configuration loaded");

        Ok(Self {
            config,
            config_path,
            output,
            data_dir: data_dir.map(|dir| resolve(&cwd, Path::new(dir))),
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(PathBuf, CliConfig)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(&config_path) {
                        return Some((config_path, config));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Session state directory: `--data-dir`, then the config file, then
    /// `.atelier` in the working directory.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        match &self.config.data_dir {
            Some(dir) => {
                let base = self
                    .config_path
                    .as_deref()
                    .and_then(Path::parent)
                    .unwrap_or(&self.cwd);
                resolve(base, dir)
            }
            None => self.cwd.join(DEFAULT_DATA_DIR),
        }
    }

    pub fn catalog(&self) -> Catalog {
        self.config.catalog()
    }

    /// Find a product by id or slug.
    pub fn find_product(&self, query: &str) -> Result<ProductRef> {
        let catalog = self.catalog();
        catalog
            .get(&ProductId::new(query))
            .or_else(|| catalog.by_slug(query))
            .cloned()
            .ok_or_else(|| anyhow!("Unknown product '{}'. Run `atelier cart show` to list the catalog.", query))
    }

    /// Open the shopping session stored in the data directory.
    pub fn open_shop(&self) -> Result<Shop> {
        self.config.validate().context("Invalid configuration")?;

        let dir = self.data_dir();
        let backend = FileBackend::open(&dir)
            .with_context(|| format!("Failed to open data directory {}", dir.display()))?;
        debug!(dir = %dir.display(), "session storage opened");

        let scheduler = ManualScheduler::new();
        let session = StorefrontSession::new(
            self.config.storefront.clone(),
            self.config.coupon_catalog(),
            backend,
            scheduler.clone(),
        )?;
        Ok(Shop { session, scheduler })
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
