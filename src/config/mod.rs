//! Build configuration - the repo-authored configuration records
//!
//! Includes:
//! - `BuildConfig`: directory layout, serve port, tool commands
//! - `SiteInfo`: site-wide metadata from `app/siteinfo.json`
//! - Per-collaborator sections: responsive breakpoints, favicon options,
//!   html-min options, service-worker globs

pub mod favicon;
pub mod htmlmin;
pub mod responsive;
pub mod sw;

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dotenv::dotenv;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::favicon::FaviconConfig;
use crate::config::htmlmin::HtmlMinConfig;
use crate::config::responsive::ResponsiveConfig;
use crate::config::sw::SwConfig;

pub const CONFIG_FILE: &str = "puggle.json";

/// Site-wide metadata, loaded from `app/siteinfo.json` and handed to every
/// rendered page as the `siteinfo` global.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl SiteInfo {
    pub fn load(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join("siteinfo.json");
        let file =
            File::open(&path).context(format!("failed to open site info file {:?}", path))?;
        serde_json::from_reader(file).context(format!("failed to parse site info {:?}", path))
    }

    pub fn name_or_default(&self) -> &str {
        self.name.as_deref().unwrap_or("puggle-web-starter")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub app_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub dist_dir: PathBuf,
    pub port: u16,
    /// External linter invoked over the client scripts.
    pub lint_command: String,
    /// Client script entries, concatenated in order into `main.min.js`.
    pub scripts: Vec<PathBuf>,
    /// Public URL queried by the pagespeed task.
    pub pagespeed_url: String,
    pub pagespeed_key: Option<String>,
    pub responsive: ResponsiveConfig,
    pub favicon: FaviconConfig,
    pub htmlmin: HtmlMinConfig,
    pub sw: SwConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::from("app"),
            tmp_dir: PathBuf::from(".tmp"),
            dist_dir: PathBuf::from("dist"),
            port: 3000,
            lint_command: String::from("eslint"),
            scripts: vec![PathBuf::from("app/scripts/main.js")],
            pagespeed_url: String::from("https://example.com"),
            pagespeed_key: None,
            responsive: ResponsiveConfig::default(),
            favicon: FaviconConfig::default(),
            htmlmin: HtmlMinConfig::default(),
            sw: SwConfig::default(),
        }
    }
}

/// Scalar overrides picked up from `PUGGLE_`-prefixed environment variables.
#[derive(Debug, Deserialize)]
struct EnvOverrides {
    app_dir: Option<PathBuf>,
    tmp_dir: Option<PathBuf>,
    dist_dir: Option<PathBuf>,
    port: Option<u16>,
    lint_command: Option<String>,
    pagespeed_url: Option<String>,
    pagespeed_key: Option<String>,
}

impl BuildConfig {
    /// Load `puggle.json` when present, fall back to defaults, then apply
    /// `.env` / environment overrides.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let mut config = if Path::new(CONFIG_FILE).exists() {
            let file = File::open(CONFIG_FILE)
                .context(format!("failed to open config file {}", CONFIG_FILE))?;
            let config = serde_json::from_reader(file)
                .context(format!("failed to parse config file {}", CONFIG_FILE))?;
            info!("Loaded config from {}.", CONFIG_FILE);
            config
        } else {
            Self::default()
        };

        let env = envy::prefixed("PUGGLE_")
            .from_env::<EnvOverrides>()
            .context("failed to read PUGGLE_* environment overrides")?;
        config.apply_overrides(env);

        Ok(config)
    }

    fn apply_overrides(&mut self, env: EnvOverrides) {
        if let Some(app_dir) = env.app_dir {
            self.app_dir = app_dir;
        }
        if let Some(tmp_dir) = env.tmp_dir {
            self.tmp_dir = tmp_dir;
        }
        if let Some(dist_dir) = env.dist_dir {
            self.dist_dir = dist_dir;
        }
        if let Some(port) = env.port {
            self.port = port;
        }
        if let Some(lint_command) = env.lint_command {
            self.lint_command = lint_command;
        }
        if let Some(pagespeed_url) = env.pagespeed_url {
            self.pagespeed_url = pagespeed_url;
        }
        if let Some(pagespeed_key) = env.pagespeed_key {
            self.pagespeed_key = Some(pagespeed_key);
        }
    }

    pub fn styles_dir(&self) -> PathBuf {
        self.app_dir.join("styles")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.app_dir.join("scripts")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.app_dir.join("images")
    }

    pub fn root_dir(&self) -> PathBuf {
        self.app_dir.join("root")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.app_dir.join("templates")
    }

    pub fn favicon_master(&self) -> PathBuf {
        self.app_dir.join("favicon.png")
    }

    pub fn favicon_markup(&self) -> PathBuf {
        self.tmp_dir.join(crate::common::FAVICON_MARKUP_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_project_layout() {
        let config = BuildConfig::default();
        assert_eq!(config.app_dir, PathBuf::from("app"));
        assert_eq!(config.dist_dir, PathBuf::from("dist"));
        assert_eq!(config.port, 3000);
        assert_eq!(config.styles_dir(), PathBuf::from("app/styles"));
        assert_eq!(config.favicon_master(), PathBuf::from("app/favicon.png"));
    }

    #[test]
    fn partial_config_file_keeps_defaults() {
        let config: BuildConfig = serde_json::from_str(r#"{"port": 8080}"#).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.dist_dir, PathBuf::from("dist"));
        assert!(!config.responsive.breakpoints.is_empty());
    }

    #[test]
    fn env_overrides_replace_only_the_set_fields() {
        let mut config = BuildConfig::default();
        config.apply_overrides(EnvOverrides {
            app_dir: None,
            tmp_dir: None,
            dist_dir: Some(PathBuf::from("public")),
            port: Some(8080),
            lint_command: None,
            pagespeed_url: None,
            pagespeed_key: Some(String::from("secret")),
        });
        assert_eq!(config.dist_dir, PathBuf::from("public"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.pagespeed_key.as_deref(), Some("secret"));
        // Untouched fields keep their defaults.
        assert_eq!(config.app_dir, PathBuf::from("app"));
        assert_eq!(config.lint_command, "eslint");
    }

    #[test]
    fn siteinfo_falls_back_to_starter_name() {
        let info = SiteInfo::default();
        assert_eq!(info.name_or_default(), "puggle-web-starter");

        let info: SiteInfo = serde_json::from_str(r#"{"name": "my-site"}"#).unwrap();
        assert_eq!(info.name_or_default(), "my-site");
    }
}
