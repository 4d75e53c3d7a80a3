//! HTML minification options, mapped onto `minify_html::Cfg`.

use minify_html::Cfg;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlMinConfig {
    pub collapse_whitespace: bool,
    pub remove_comments: bool,
    pub minify_css: bool,
    pub minify_js: bool,
}

impl Default for HtmlMinConfig {
    fn default() -> Self {
        Self {
            collapse_whitespace: true,
            remove_comments: true,
            minify_css: true,
            minify_js: true,
        }
    }
}

impl HtmlMinConfig {
    pub fn to_cfg(&self) -> Cfg {
        let mut cfg = Cfg::default();
        cfg.keep_comments = !self.remove_comments;
        cfg.minify_css = self.minify_css;
        cfg.minify_js = self.minify_js;
        // Whitespace collapsing is the minifier's default mode; opting out
        // keeps the document byte-identical apart from comments.
        if !self.collapse_whitespace {
            cfg.keep_spaces_between_attributes = true;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cfg_mapping_tracks_comment_option() {
        let mut config = HtmlMinConfig::default();
        assert!(!config.to_cfg().keep_comments);
        config.remove_comments = false;
        assert!(config.to_cfg().keep_comments);
    }
}
