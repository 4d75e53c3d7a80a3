//! Favicon generation options
//!
//! Mirrors the icon matrix browsers actually request: classic favicons,
//! android-chrome sizes up to 512, and apple-touch icons rendered on a solid
//! background with a margin. The versioning parameter cache-busts the markup
//! whenever the master picture changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaviconConfig {
    pub app_name: Option<String>,
    pub app_description: Option<String>,
    pub developer_name: Option<String>,
    pub developer_url: Option<String>,
    /// Main foreground color (theme-color meta, pinned-tab tint).
    pub theme_color: String,
    /// Background fill behind apple-touch icons and the manifest background.
    pub background: String,
    pub lang: String,
    pub display: String,
    pub orientation: String,
    pub start_url: String,
    pub classic_sizes: Vec<u32>,
    pub android_sizes: Vec<u32>,
    pub apple_sizes: Vec<u32>,
    /// Fraction of the apple icon edge left as margin around the picture.
    pub apple_margin: f32,
    /// Cache-busting query parameter appended to every icon URL.
    pub version_param: String,
    pub version_value: String,
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self {
            app_name: None,
            app_description: None,
            developer_name: None,
            developer_url: None,
            theme_color: String::from("#247cbf"),
            background: String::from("#ffffff"),
            lang: String::from("en-US"),
            display: String::from("standalone"),
            orientation: String::from("portrait"),
            start_url: String::from("/"),
            classic_sizes: vec![16, 32, 48],
            android_sizes: vec![36, 48, 72, 96, 144, 192, 256, 384, 512],
            apple_sizes: vec![57, 76, 120, 152, 167, 180],
            apple_margin: 0.35,
            version_param: String::from("v"),
            version_value: String::from("e4fDD2So21"),
        }
    }
}

impl FaviconConfig {
    /// `?v=...` query string shared by every generated icon URL.
    pub fn version_query(&self) -> String {
        format!("?{}={}", self.version_param, self.version_value)
    }
}
