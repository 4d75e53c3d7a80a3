//! Responsive-image breakpoint configuration
//!
//! The breakpoint table mirrors the size ladder served to clients: a blurred
//! placeholder, thumbnail, phone, laptop and retina widths, with WebP
//! variants at the srcset sizes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoint {
    /// Target width; `None` keeps the source dimensions.
    pub width: Option<u32>,
    /// When set, the output is center-cropped to `width` x `height`.
    pub height: Option<u32>,
    /// Filename suffix inserted before the extension (`pic-350px.jpg`).
    pub suffix: String,
    /// Extension override for format conversion (`webp`).
    pub ext: Option<String>,
}

impl Default for Breakpoint {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            suffix: String::new(),
            ext: None,
        }
    }
}

impl Breakpoint {
    fn resize(width: u32, suffix: &str) -> Self {
        Self {
            width: Some(width),
            suffix: suffix.to_string(),
            ..Self::default()
        }
    }

    fn webp(width: u32, suffix: &str) -> Self {
        Self {
            width: Some(width),
            suffix: suffix.to_string(),
            ext: Some(String::from("webp")),
            ..Self::default()
        }
    }

    /// Rewrite `source` with this breakpoint's suffix and extension override.
    pub fn rename(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = match &self.ext {
            Some(ext) => ext.clone(),
            None => source
                .extension()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let name = if ext.is_empty() {
            format!("{}{}", stem, self.suffix)
        } else {
            format!("{}{}.{}", stem, self.suffix, ext)
        };
        source.with_file_name(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsiveConfig {
    pub breakpoints: Vec<Breakpoint>,
    /// Never upscale a source to reach a breakpoint width.
    pub without_enlargement: bool,
    /// When set, a source too small for a breakpoint fails the build
    /// instead of being skipped.
    pub error_on_enlargement: bool,
    /// Files the raster pattern does not grab (svg etc.) are copied through.
    pub pass_through_unused: bool,
}

impl Default for ResponsiveConfig {
    fn default() -> Self {
        Self {
            breakpoints: vec![
                // Blur: fast blurred placeholder.
                Breakpoint::resize(30, "-blur"),
                // Tiny.
                Breakpoint::resize(350, "-350px"),
                // TinySquared: small thumbs, center-cropped.
                Breakpoint {
                    width: Some(350),
                    height: Some(350),
                    suffix: String::from("-350px-thumb"),
                    ext: None,
                },
                // Small: small phone.
                Breakpoint::resize(700, "-700px"),
                Breakpoint::webp(700, "-700px"),
                // Medium: big phone / small laptop.
                Breakpoint::resize(1400, "-1400px"),
                Breakpoint::webp(1400, "-1400px"),
                // Large: retina small.
                Breakpoint::resize(2800, "-2800px"),
                Breakpoint::webp(2800, "-2800px"),
                // XLarge: retina large.
                Breakpoint::resize(5600, "-5600px"),
                Breakpoint::webp(5600, "-5600px"),
                // Original.
                Breakpoint {
                    suffix: String::from("-original"),
                    ..Breakpoint::default()
                },
            ],
            without_enlargement: true,
            error_on_enlargement: false,
            pass_through_unused: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_inserts_suffix_before_extension() {
        let bp = Breakpoint::resize(350, "-350px");
        assert_eq!(
            bp.rename(Path::new("gallery/pic.jpg")),
            PathBuf::from("gallery/pic-350px.jpg")
        );
    }

    #[test]
    fn rename_applies_extension_override() {
        let bp = Breakpoint::webp(700, "-700px");
        assert_eq!(
            bp.rename(Path::new("pic.png")),
            PathBuf::from("pic-700px.webp")
        );
    }

    #[test]
    fn default_ladder_has_all_retina_suffixes_in_px() {
        let config = ResponsiveConfig::default();
        // Every sized suffix ends in `px` (the original table had one typo'd
        // `-2800`; the ladder is normalized here).
        for bp in config.breakpoints.iter().filter(|b| b.width.is_some()) {
            if bp.suffix != "-blur" && bp.suffix != "-350px-thumb" {
                assert!(bp.suffix.ends_with("px"), "suffix {:?}", bp.suffix);
            }
        }
        assert_eq!(config.breakpoints.len(), 12);
    }

    #[test]
    fn default_flags_match_non_strict_behavior() {
        let config = ResponsiveConfig::default();
        assert!(config.without_enlargement);
        assert!(!config.error_on_enlargement);
        assert!(config.pass_through_unused);
    }
}
