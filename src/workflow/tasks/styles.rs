//! Styles task - compile and minify stylesheets
//!
//! Every non-partial `.scss` plus plain `.css` under `app/styles/` is
//! compiled with `grass`: expanded output goes to the `.tmp` cache,
//! compressed output to `dist/styles/`. Partials (leading underscore) are
//! reachable only through `@use`/`@import`. Sources whose cached output is
//! already newer are skipped.

use std::path::Path;

use anyhow::{Context, Result};
use grass::{Options, OutputStyle};
use walkdir::WalkDir;

use crate::utils::{PathExt, SizeReport, newer, output_path, write_file};
use crate::workflow::BuildContext;

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.starts_with('_'))
        .unwrap_or(false)
}

fn is_style_entry(path: &Path) -> bool {
    match path.ext_lower().as_str() {
        "scss" => !is_partial(path),
        "css" => true,
        _ => false,
    }
}

pub fn run(ctx: &BuildContext) -> Result<()> {
    let styles_dir = ctx.config.styles_dir();
    if !styles_dir.exists() {
        return Ok(());
    }

    let tmp_styles = ctx.config.tmp_dir.join("styles");
    let dist_styles = ctx.config.dist_dir.join("styles");
    let mut report = SizeReport::new("styles");

    for entry in WalkDir::new(&styles_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_style_entry(entry.path()) {
            continue;
        }

        let cached = output_path(&tmp_styles, &styles_dir, entry.path()).with_extension("css");
        if !newer(entry.path(), &cached)? {
            continue;
        }

        let expanded = grass::from_path(
            entry.path(),
            &Options::default()
                .style(OutputStyle::Expanded)
                .load_path(&styles_dir),
        )
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context(format!("failed to compile stylesheet {:?}", entry.path()))?;

        let compressed = grass::from_path(
            entry.path(),
            &Options::default()
                .style(OutputStyle::Compressed)
                .load_path(&styles_dir),
        )
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context(format!("failed to compress stylesheet {:?}", entry.path()))?;

        write_file(&cached, &expanded)?;
        let dest = output_path(&dist_styles, &styles_dir, entry.path()).with_extension("css");
        let bytes = write_file(&dest, &compressed)?;
        report.add(&dest, bytes);
    }
    report.finish();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::workflow::BuildMode;
    use std::fs;

    fn ctx_for(dir: &Path) -> BuildContext {
        let config = BuildConfig {
            app_dir: dir.join("app"),
            tmp_dir: dir.join(".tmp"),
            dist_dir: dir.join("dist"),
            ..BuildConfig::default()
        };
        BuildContext::new(config, BuildMode::Production)
    }

    #[test]
    fn partials_are_excluded_from_entries() {
        assert!(is_style_entry(Path::new("app/styles/main.scss")));
        assert!(is_style_entry(Path::new("app/styles/vendor.css")));
        assert!(!is_style_entry(Path::new("app/styles/_mixins.scss")));
        assert!(!is_style_entry(Path::new("app/styles/readme.md")));
    }

    #[test]
    fn scss_compiles_through_partials_to_both_trees() {
        let dir = tempfile::tempdir().unwrap();
        let styles = dir.path().join("app").join("styles");
        fs::create_dir_all(&styles).unwrap();
        fs::write(styles.join("_colors.scss"), "$fg: #247cbf;").unwrap();
        fs::write(
            styles.join("main.scss"),
            "@use \"colors\";\nbody { color: colors.$fg; }",
        )
        .unwrap();

        let ctx = ctx_for(dir.path());
        run(&ctx).unwrap();

        let compressed =
            fs::read_to_string(dir.path().join("dist").join("styles").join("main.css")).unwrap();
        assert!(compressed.contains("#247cbf"));
        assert!(!compressed.contains('\n') || compressed.trim_end().lines().count() == 1);
        // No output for the partial itself.
        assert!(!dir.path().join("dist").join("styles").join("_colors.css").exists());
        // Expanded copy lands in the cache.
        assert!(dir.path().join(".tmp").join("styles").join("main.css").exists());
    }

    #[test]
    fn up_to_date_sources_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let styles = dir.path().join("app").join("styles");
        fs::create_dir_all(&styles).unwrap();
        fs::write(styles.join("main.scss"), "body { margin: 0; }").unwrap();

        let ctx = ctx_for(dir.path());
        run(&ctx).unwrap();

        // Make the cache strictly newer, then break the source: a rerun must
        // not touch it.
        let cached = dir.path().join(".tmp").join("styles").join("main.css");
        let later = filetime::FileTime::from_unix_time(
            filetime::FileTime::now().unix_seconds() + 60,
            0,
        );
        filetime::set_file_mtime(&cached, later).unwrap();
        fs::write(styles.join("main.scss"), "this is { not valid scss").unwrap();
        filetime::set_file_mtime(
            styles.join("main.scss"),
            filetime::FileTime::from_unix_time(filetime::FileTime::now().unix_seconds() - 60, 0),
        )
        .unwrap();

        run(&ctx).unwrap();
    }
}
