//! Service-worker precache configuration
//!
//! The glob set selects which generated assets land in the precache
//! manifest; patterns are matched against `/`-separated paths relative to
//! the output directory.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwConfig {
    /// Cache id; falls back to the site name. Avoids cache conflicts when
    /// several projects serve on localhost.
    pub cache_id: Option<String>,
    pub static_file_globs: Vec<String>,
    /// Scripts pulled in via `importScripts`; the runtime-caching script
    /// must come after its toolbox dependency.
    pub import_scripts: Vec<String>,
}

impl Default for SwConfig {
    fn default() -> Self {
        Self {
            cache_id: None,
            static_file_globs: vec![
                String::from("images/**/*"),
                String::from("scripts/**/*.js"),
                String::from("styles/**/*.css"),
                String::from("**/*.{html,json}"),
            ],
            import_scripts: vec![
                String::from("scripts/sw/sw-toolbox.js"),
                String::from("scripts/sw/runtime-caching.js"),
            ],
        }
    }
}

impl SwConfig {
    pub fn glob_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.static_file_globs {
            let glob = Glob::new(pattern)
                .context(format!("invalid precache glob pattern {:?}", pattern))?;
            builder.add(glob);
        }
        builder.build().context("failed to build precache glob set")
    }
}
