//! Scripts task - concatenate and minify the client script entries
//!
//! The configured entries are concatenated in order into `main.min.js` and
//! minified with `minify-js`. The unminified concatenation is cached in
//! `.tmp/scripts/` and used for the mtime skip check.

use std::fs;

use anyhow::{Context, Result};
use minify_js::{Session, TopLevelMode, minify};

use crate::utils::{SizeReport, newer, write_file};
use crate::workflow::BuildContext;

pub const BUNDLE_NAME: &str = "main.min.js";

pub fn run(ctx: &BuildContext) -> Result<()> {
    let entries: Vec<_> = ctx
        .config
        .scripts
        .iter()
        .filter(|path| path.exists())
        .collect();
    if entries.is_empty() {
        return Ok(());
    }

    let cached = ctx.config.tmp_dir.join("scripts").join(BUNDLE_NAME);
    let dest = ctx.config.dist_dir.join("scripts").join(BUNDLE_NAME);
    let mut stale = false;
    for entry in &entries {
        if newer(entry, &cached)? {
            stale = true;
            break;
        }
    }
    if !stale && dest.exists() {
        return Ok(());
    }

    let mut concatenated = String::new();
    for entry in &entries {
        let source = fs::read_to_string(entry)
            .context(format!("failed to read script entry {:?}", entry))?;
        concatenated.push_str(&source);
        if !concatenated.ends_with('\n') {
            concatenated.push('\n');
        }
    }

    let session = Session::new();
    let mut minified = Vec::new();
    minify(
        &session,
        TopLevelMode::Global,
        concatenated.as_bytes(),
        &mut minified,
    )
    .map_err(|e| anyhow::anyhow!("failed to minify scripts: {:?}", e))?;

    write_file(&cached, &concatenated)?;
    let bytes = write_file(&dest, &minified)?;

    let mut report = SizeReport::new("scripts");
    report.add(&dest, bytes);
    report.finish();

    Ok(())
}
