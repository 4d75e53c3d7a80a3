//! Source watcher - map filesystem events to the tasks they invalidate
//!
//! Watch mapping (mirrors the original watch table):
//! pages/sidecars -> html; styles -> styles; scripts -> lint + scripts;
//! images -> images; root files -> copy; the favicon master -> favicon then
//! html (the markup snippet is injected at render time).

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, warn};
use notify::{RecursiveMode, Watcher};
use path_clean::PathClean;

use crate::common::{BUILD_STAMP, WATCH_DEBOUNCE_MS};
use crate::config::BuildConfig;
use crate::utils::PathExt;
use crate::workflow::flows::{self, rebuild_plan};
use crate::workflow::{BuildContext, Task};

/// Which tasks a changed path invalidates. Position in the returned list is
/// a sequential stage: a later task must not start before the earlier one
/// finished (favicon writes the markup snippet html injects, lint gates
/// scripts).
pub fn tasks_for_path(config: &BuildConfig, path: &Path) -> Vec<Task> {
    if path == config.favicon_master() {
        return vec![flows::FAVICON, flows::HTML];
    }
    if path.starts_with(config.root_dir()) {
        return vec![flows::COPY];
    }
    if path.starts_with(config.styles_dir()) {
        return match path.ext_lower().as_str() {
            "scss" | "css" => vec![flows::STYLES],
            _ => vec![],
        };
    }
    if path.starts_with(config.scripts_dir()) {
        return match path.ext_lower().as_str() {
            "js" => vec![flows::LINT, flows::SCRIPTS],
            _ => vec![],
        };
    }
    if path.starts_with(config.images_dir()) {
        return vec![flows::IMAGES];
    }
    if path.starts_with(&config.app_dir) {
        return match path.ext_lower().as_str() {
            "tera" | "json" => vec![flows::HTML],
            _ => vec![],
        };
    }
    vec![]
}

/// Merge the per-path task lists into stages. A task keeps the latest stage
/// index any path assigns it, so html changed alongside the favicon master
/// still waits for favicon to finish.
fn tasks_for_batch(config: &BuildConfig, paths: &[std::path::PathBuf]) -> Vec<Vec<Task>> {
    let mut slot: HashMap<&'static str, usize> = HashMap::new();
    let mut order: Vec<Task> = Vec::new();
    for path in paths {
        for (position, task) in tasks_for_path(config, path).into_iter().enumerate() {
            match slot.get_mut(task.name) {
                Some(existing) => *existing = (*existing).max(position),
                None => {
                    slot.insert(task.name, position);
                    order.push(task);
                }
            }
        }
    }

    let stage_count = slot.values().map(|position| position + 1).max().unwrap_or(0);
    let mut stages: Vec<Vec<Task>> = vec![Vec::new(); stage_count];
    for task in order {
        stages[slot[task.name]].push(task);
    }
    stages.retain(|stage| !stage.is_empty());
    stages
}

/// Blocking watch loop; returns when `stop` flips.
pub fn watch_loop(ctx: &BuildContext, stop: &AtomicBool) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("failed to create filesystem watcher")?;
    watcher
        .watch(&ctx.config.app_dir, RecursiveMode::Recursive)
        .context(format!("failed to watch {:?}", ctx.config.app_dir))?;

    // Events arrive with absolute paths; the watch table speaks in
    // config-relative ones.
    let app_abs = std::fs::canonicalize(&ctx.config.app_dir)
        .context(format!("failed to canonicalize {:?}", ctx.config.app_dir))?;

    let mut pending: Vec<std::path::PathBuf> = Vec::new();
    loop {
        match rx.recv_timeout(Duration::from_millis(WATCH_DEBOUNCE_MS)) {
            Ok(Ok(event)) => {
                pending.extend(event.paths.into_iter().map(|path| {
                    match path.strip_prefix(&app_abs) {
                        Ok(rel) => ctx.config.app_dir.join(rel).clean(),
                        Err(_) => path.clean(),
                    }
                }));
            }
            Ok(Err(e)) => {
                warn!("Watch event error: {}", e);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if !pending.is_empty() {
                    let paths = std::mem::take(&mut pending);
                    let stages = tasks_for_batch(&ctx.config, &paths);
                    if stages.is_empty() {
                        debug!("No tasks for {} changed path(s).", paths.len());
                    } else if let Err(e) = rebuild_plan(stages).execute(ctx) {
                        // Keep watching; a broken source will be fixed and
                        // saved again.
                        warn!("Rebuild failed: {:?}", e);
                    } else {
                        BUILD_STAMP
                            .store(Utc::now().timestamp_millis() as u64, Ordering::SeqCst);
                    }
                }
                if stop.load(Ordering::SeqCst) {
                    return Ok(());
                }
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Ok(());
            }
        }
    }
}
