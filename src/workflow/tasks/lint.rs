//! Lint task - run the configured external linter over the client scripts
//!
//! Lint output passes straight through to the console. A failure is fatal
//! for a production build; while serving, it is reported and the watch loop
//! keeps going.

use std::process::Command;

use anyhow::{Result, bail};
use log::{error, warn};

use crate::workflow::{BuildContext, BuildMode};

pub fn run(ctx: &BuildContext) -> Result<()> {
    let scripts_dir = ctx.config.scripts_dir();
    if !scripts_dir.exists() {
        return Ok(());
    }

    let mut parts = ctx.config.lint_command.split_whitespace();
    let Some(program) = parts.next() else {
        return Ok(());
    };

    let status = Command::new(program)
        .args(parts)
        .arg(&scripts_dir)
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => match ctx.mode {
            BuildMode::Production => bail!(
                "linter `{}` reported errors (exit status {})",
                ctx.config.lint_command,
                status
            ),
            BuildMode::Development => {
                warn!(
                    "Linter `{}` reported errors; continuing in development.",
                    ctx.config.lint_command
                );
                Ok(())
            }
        },
        Err(_) => match ctx.mode {
            BuildMode::Production => bail!(
                "`{}` is not installed or not available in PATH. Please install it before building.",
                program
            ),
            BuildMode::Development => {
                error!(
                    "`{}` is not installed or not available in PATH; skipping lint.",
                    program
                );
                Ok(())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use std::fs;

    fn ctx_with_linter(dir: &std::path::Path, command: &str, mode: BuildMode) -> BuildContext {
        fs::create_dir_all(dir.join("app").join("scripts")).unwrap();
        let config = BuildConfig {
            app_dir: dir.join("app"),
            lint_command: command.to_string(),
            ..BuildConfig::default()
        };
        BuildContext::new(config, mode)
    }

    #[test]
    fn missing_linter_fails_production_builds() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_with_linter(
            dir.path(),
            "definitely-not-a-real-linter",
            BuildMode::Production,
        );
        assert!(run(&ctx).is_err());
    }

    #[test]
    fn missing_linter_is_tolerated_in_development() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx_with_linter(
            dir.path(),
            "definitely-not-a-real-linter",
            BuildMode::Development,
        );
        run(&ctx).unwrap();
    }

    #[test]
    fn missing_scripts_dir_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig {
            app_dir: dir.path().join("app"),
            ..BuildConfig::default()
        };
        run(&BuildContext::new(config, BuildMode::Production)).unwrap();
    }
}
