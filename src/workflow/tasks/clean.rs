//! Clean task - reset the output directory and the build cache
//!
//! `dist/.git` survives the clean so a deploy-from-dist checkout keeps its
//! history.

use std::fs;

use anyhow::{Context, Result};
use log::info;

use crate::workflow::BuildContext;

pub fn run(ctx: &BuildContext) -> Result<()> {
    let tmp_dir = &ctx.config.tmp_dir;
    if tmp_dir.exists() {
        fs::remove_dir_all(tmp_dir)
            .context(format!("failed to remove cache directory {:?}", tmp_dir))?;
        info!("Removed cache directory {:?}.", tmp_dir);
    }

    let dist_dir = &ctx.config.dist_dir;
    if !dist_dir.exists() {
        return Ok(());
    }

    for entry in fs::read_dir(dist_dir)
        .context(format!("failed to read output directory {:?}", dist_dir))?
    {
        let entry = entry?;
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path).context(format!("failed to remove {:?}", path))?;
        } else {
            fs::remove_file(&path).context(format!("failed to remove {:?}", path))?;
        }
    }
    info!("Cleaned output directory {:?}.", dist_dir);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::workflow::BuildMode;
    use std::fs::File;
    use std::path::PathBuf;

    fn ctx_for(dir: &std::path::Path) -> BuildContext {
        let config = BuildConfig {
            app_dir: dir.join("app"),
            tmp_dir: dir.join(".tmp"),
            dist_dir: dir.join("dist"),
            ..BuildConfig::default()
        };
        BuildContext::new(config, BuildMode::Production)
    }

    #[test]
    fn clean_preserves_dist_git() {
        let dir = tempfile::tempdir().unwrap();
        let dist = dir.path().join("dist");
        fs::create_dir_all(dist.join(".git")).unwrap();
        fs::create_dir_all(dist.join("styles")).unwrap();
        File::create(dist.join("index.html")).unwrap();
        File::create(dist.join(".git").join("HEAD")).unwrap();
        fs::create_dir_all(dir.path().join(".tmp")).unwrap();

        run(&ctx_for(dir.path())).unwrap();

        assert!(dist.join(".git").join("HEAD").exists());
        assert!(!dist.join("styles").exists());
        assert!(!dist.join("index.html").exists());
        assert!(!dir.path().join(".tmp").exists());
    }

    #[test]
    fn clean_tolerates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_for(&PathBuf::from(dir.path()));
        run(&ctx).unwrap();
    }
}
