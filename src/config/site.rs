//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable that overrides `environment`
pub const ENV_OVERRIDE: &str = "FOLIO_ENV";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub name: String,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(default)]
    pub author: AuthorConfig,
    pub navigation: Vec<NavItem>,

    // Directory
    pub content_dir: String,
    pub blog_dir: String,
    pub public_dir: String,

    // Runtime
    pub environment: Environment,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Home page
    #[serde(default)]
    pub hero: HeroConfig,
    #[serde(default)]
    pub about: AboutConfig,
    pub recent_posts: usize,

    // Projects
    pub projects: Vec<Project>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Tim".to_string(),
            title: "Tim".to_string(),
            description: "Personal portfolio showcasing my homelab projects and music production."
                .to_string(),
            url: "http://localhost:3000".to_string(),
            author: AuthorConfig::default(),
            navigation: vec![
                NavItem::new("Home", "/"),
                NavItem::new("Projects", "/#projects"),
                NavItem::new("Blog", "/blog"),
                NavItem::new("Contact", "/#contact"),
            ],

            content_dir: "content".to_string(),
            blog_dir: "blog".to_string(),
            public_dir: "public".to_string(),

            environment: Environment::Development,
            highlight: HighlightConfig::default(),

            hero: HeroConfig::default(),
            about: AboutConfig::default(),
            recent_posts: 3,

            projects: Project::defaults(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        // An empty file is valid and means "all defaults"
        if content.trim().is_empty() {
            return Ok(SiteConfig::default());
        }
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `FOLIO_ENV` if it is set to a known environment name
    pub fn apply_env_override(&mut self) {
        if let Ok(value) = std::env::var(ENV_OVERRIDE) {
            match value.parse::<Environment>() {
                Ok(env) => self.environment = env,
                Err(e) => tracing::warn!("Ignoring {}: {}", ENV_OVERRIDE, e),
            }
        }
    }

    /// Find a project by slug
    pub fn project(&self, slug: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.slug == slug)
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment {:?}", other)),
        }
    }
}

/// Site owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub email: String,
    pub github: String,
    pub twitter: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        Self {
            name: "Tim".to_string(),
            email: "tim@heybubitstim.com".to_string(),
            github: "simpletim76".to_string(),
            twitter: "@simpletim76".to_string(),
        }
    }
}

/// One navigation link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    pub name: String,
    pub href: String,
}

impl NavItem {
    pub fn new(name: &str, href: &str) -> Self {
        Self {
            name: name.to_string(),
            href: href.to_string(),
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

/// Hero section of the home page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    pub greeting: String,
    pub tagline: String,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            greeting: "Hey, I'm Tim".to_string(),
            tagline: "Homelab tinkerer, music producer and weekend woodworker.".to_string(),
        }
    }
}

/// About section of the home page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutConfig {
    pub paragraphs: Vec<String>,
    pub skills: Vec<String>,
}

impl Default for AboutConfig {
    fn default() -> Self {
        Self {
            paragraphs: vec![
                "I build and run my own infrastructure at home, make music, and turn rough lumber into furniture.".to_string(),
            ],
            skills: vec![
                "Linux".to_string(),
                "Networking".to_string(),
                "Docker".to_string(),
                "Audio Production".to_string(),
                "Woodworking".to_string(),
            ],
        }
    }
}

/// A showcased project with its detail page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub icon: String,
    /// Card text on the home page
    #[serde(default)]
    pub summary: String,
    /// Subtitle on the detail page
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sections: Vec<ProjectSection>,
}

/// A titled bullet list on a project page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    pub title: String,
    #[serde(default)]
    pub items: Vec<String>,
}

impl Project {
    fn defaults() -> Vec<Project> {
        fn section(title: &str, items: &[&str]) -> ProjectSection {
            ProjectSection {
                title: title.to_string(),
                items: items.iter().map(|s| s.to_string()).collect(),
            }
        }

        vec![
            Project {
                slug: "homelab".to_string(),
                title: "Homelab Infrastructure".to_string(),
                icon: "🏠".to_string(),
                summary: "Self-hosted services, network configuration, and infrastructure automation for a complete home server setup.".to_string(),
                headline: "Building and maintaining a complete home server infrastructure".to_string(),
                tags: vec!["Self-Hosted".to_string(), "Networking".to_string(), "Automation".to_string()],
                sections: vec![
                    section(
                        "Services",
                        &[
                            "Proxmox virtualization platform",
                            "Docker containerization",
                            "Network storage (NAS)",
                            "Media server (Plex/Jellyfin)",
                        ],
                    ),
                    section(
                        "Infrastructure",
                        &["Automated backups", "VPN & remote access"],
                    ),
                ],
            },
            Project {
                slug: "music".to_string(),
                title: "Music Production".to_string(),
                icon: "🎵".to_string(),
                summary: "Audio engineering, music composition, and creative sound design projects.".to_string(),
                headline: "Composing, recording and mixing original music".to_string(),
                tags: vec!["Music".to_string(), "Audio".to_string(), "Creative".to_string()],
                sections: Vec::new(),
            },
            Project {
                slug: "woodworking".to_string(),
                title: "Woodworking".to_string(),
                icon: "🪵".to_string(),
                summary: "Handcrafted furniture, custom builds, and traditional woodworking techniques.".to_string(),
                headline: "Handcrafted furniture and custom builds".to_string(),
                tags: vec!["Crafts".to_string(), "DIY".to_string(), "Design".to_string()],
                sections: Vec::new(),
            },
        ]
    }
}
