//! Copy task - move not-to-be-processed files from `app/root/` into the
//! output tree verbatim, dotfiles included.

use anyhow::Result;
use walkdir::WalkDir;

use crate::utils::{SizeReport, copy_file, output_path};
use crate::workflow::BuildContext;

pub fn run(ctx: &BuildContext) -> Result<()> {
    let root_dir = ctx.config.root_dir();
    if !root_dir.exists() {
        return Ok(());
    }

    let mut report = SizeReport::show_files("copy");
    for entry in WalkDir::new(&root_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let dest = output_path(&ctx.config.dist_dir, &root_dir, entry.path());
        let bytes = copy_file(entry.path(), &dest)?;
        report.add(entry.path(), bytes);
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

    #[test]
    fn copies_dotfiles_and_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("app").join("root");
        fs::create_dir_all(root.join("well-known")).unwrap();
        fs::write(root.join(".htaccess"), "deny").unwrap();
        fs::write(root.join("robots.txt"), "User-agent: *").unwrap();
        fs::write(root.join("well-known").join("keybase.txt"), "proof").unwrap();

        let config = BuildConfig {
            app_dir: dir.path().join("app"),
            tmp_dir: dir.path().join(".tmp"),
            dist_dir: dir.path().join("dist"),
            ..BuildConfig::default()
        };
        let ctx = BuildContext::new(config, BuildMode::Production);
        run(&ctx).unwrap();

        let dist = dir.path().join("dist");
        assert_eq!(fs::read_to_string(dist.join(".htaccess")).unwrap(), "deny");
        assert!(dist.join("robots.txt").exists());
        assert!(dist.join("well-known").join("keybase.txt").exists());
    }
}
