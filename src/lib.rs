//! folio-rs: a personal portfolio and blog server
//!
//! Blog posts are Markdown/MDX files with front-matter in a content
//! directory that a CMS or a text editor maintains. Posts are read from
//! disk on every request; nothing is generated ahead of time.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::PostRepository;

/// Name of the site configuration file in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// The portfolio site
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory (holds `blog/`)
    pub content_dir: PathBuf,
    /// Static files served as-is
    pub public_dir: PathBuf,
}

impl Folio {
    /// Create a new Folio instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };
        config.apply_env_override();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Folio instance from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        }
    }

    /// Directory holding the blog posts
    pub fn blog_dir(&self) -> PathBuf {
        self.content_dir.join(&self.config.blog_dir)
    }

    /// Repository over the blog directory
    pub fn posts(&self) -> PostRepository {
        PostRepository::new(self.blog_dir())
    }
}
