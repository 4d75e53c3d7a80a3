//! Build workflow - task sequencing and stage execution
//!
//! A plan is an ordered list of stages; each stage is a set of independent
//! tasks run in parallel (fan-out/join on the worker pool, no shared mutable
//! state). A stage starts only once the previous stage has fully succeeded,
//! and the first failing task fails the whole plan.

pub mod flows;
pub mod tasks;

use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;

use crate::common::WORKER_RAYON_POOL;
use crate::config::{BuildConfig, SiteInfo};

/// Whether the plan is producing a deployable site or a development preview.
/// Development relaxes lint failures and skips the service worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Production,
    Development,
}

pub struct BuildContext {
    pub config: BuildConfig,
    pub siteinfo: SiteInfo,
    pub mode: BuildMode,
}

impl BuildContext {
    pub fn new(config: BuildConfig, mode: BuildMode) -> Self {
        // A missing siteinfo.json is fine for everything except html/sw;
        // those tasks surface their own error when they need a field.
        let siteinfo = SiteInfo::load(&config.app_dir).unwrap_or_default();
        Self {
            config,
            siteinfo,
            mode,
        }
    }
}

pub type TaskFn = fn(&BuildContext) -> Result<()>;

#[derive(Clone, Copy)]
pub struct Task {
    pub name: &'static str,
    pub run: TaskFn,
}

impl Task {
    pub const fn new(name: &'static str, run: TaskFn) -> Self {
        Self { name, run }
    }
}

pub struct Stage {
    pub tasks: Vec<Task>,
}

impl Stage {
    pub fn single(task: Task) -> Self {
        Self { tasks: vec![task] }
    }

    pub fn parallel(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

pub struct Plan {
    pub name: &'static str,
    pub stages: Vec<Stage>,
}

impl Plan {
    /// Run every stage in order; tasks inside a stage fan out on the worker
    /// pool and the stage joins before the next one starts.
    pub fn execute(&self, ctx: &BuildContext) -> Result<()> {
        let start_time = Instant::now();
        info!("Running plan '{}'...", self.name);

        for stage in &self.stages {
            if stage.tasks.len() == 1 {
                run_task(&stage.tasks[0], ctx)?;
            } else {
                WORKER_RAYON_POOL.install(|| {
                    stage
                        .tasks
                        .par_iter()
                        .try_for_each(|task| run_task(task, ctx))
                })?;
            }
        }

        let duration = format!("{:?}", start_time.elapsed());
        info!(duration = &*duration; "Plan '{}' finished.", self.name);
        Ok(())
    }

    /// Ordered task names, stage by stage.
    pub fn task_names(&self) -> Vec<Vec<&'static str>> {
        self.stages
            .iter()
            .map(|stage| stage.tasks.iter().map(|t| t.name).collect())
            .collect()
    }
}

fn run_task(task: &Task, ctx: &BuildContext) -> Result<()> {
    let start_time = Instant::now();
    (task.run)(ctx).context(format!("task '{}' failed", task.name))?;
    let duration = format!("{:?}", start_time.elapsed());
    info!(duration = &*duration; "Task '{}' done.", task.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Separate statics per test; the harness runs tests concurrently.
    static STAGE_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());
    static FAILURE_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());
    static PARALLEL_COUNT: AtomicUsize = AtomicUsize::new(0);

    fn test_ctx() -> BuildContext {
        BuildContext {
            config: BuildConfig::default(),
            siteinfo: SiteInfo::default(),
            mode: BuildMode::Development,
        }
    }

    fn log_first(_: &BuildContext) -> Result<()> {
        STAGE_LOG.lock().unwrap().push("first");
        Ok(())
    }

    fn log_second(_: &BuildContext) -> Result<()> {
        STAGE_LOG.lock().unwrap().push("second");
        Ok(())
    }

    fn count_parallel(_: &BuildContext) -> Result<()> {
        PARALLEL_COUNT.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn fail(_: &BuildContext) -> Result<()> {
        anyhow::bail!("boom")
    }

    #[test]
    fn stages_run_in_declared_order() {
        STAGE_LOG.lock().unwrap().clear();
        let plan = Plan {
            name: "ordering",
            stages: vec![
                Stage::single(Task::new("first", log_first)),
                Stage::single(Task::new("second", log_second)),
            ],
        };
        plan.execute(&test_ctx()).unwrap();
        assert_eq!(*STAGE_LOG.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn parallel_stage_joins_all_tasks() {
        PARALLEL_COUNT.store(0, Ordering::SeqCst);
        let plan = Plan {
            name: "fanout",
            stages: vec![Stage::parallel(vec![
                Task::new("a", count_parallel),
                Task::new("b", count_parallel),
                Task::new("c", count_parallel),
            ])],
        };
        plan.execute(&test_ctx()).unwrap();
        assert_eq!(PARALLEL_COUNT.load(Ordering::SeqCst), 3);
    }

    fn log_unreached(_: &BuildContext) -> Result<()> {
        FAILURE_LOG.lock().unwrap().push("unreached");
        Ok(())
    }

    #[test]
    fn failing_task_stops_later_stages() {
        let plan = Plan {
            name: "failure",
            stages: vec![
                Stage::single(Task::new("explode", fail)),
                Stage::single(Task::new("unreached", log_unreached)),
            ],
        };
        let err = plan.execute(&test_ctx()).unwrap_err();
        assert!(err.to_string().contains("explode"));
        assert!(FAILURE_LOG.lock().unwrap().is_empty());
    }
}
