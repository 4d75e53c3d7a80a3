//! The build plans: which tasks run, in which stages.
//!
//! Ordering invariants: styles run before html so inlined asset references
//! resolve; favicon runs before html so the markup snippet exists for
//! injection; the service worker is generated last, after every asset has
//! been copied into the output tree.

use crate::workflow::tasks;
use crate::workflow::{Plan, Stage, Task};

pub const CLEAN: Task = Task::new("clean", tasks::clean::run);
pub const LINT: Task = Task::new("lint", tasks::lint::run);
pub const STYLES: Task = Task::new("styles", tasks::styles::run);
pub const SCRIPTS: Task = Task::new("scripts", tasks::scripts::run);
pub const IMAGES: Task = Task::new("images", tasks::images::run);
pub const HTML: Task = Task::new("html", tasks::html::run);
pub const COPY: Task = Task::new("copy", tasks::copy::run);
pub const FAVICON: Task = Task::new("favicon", tasks::favicon::run);
pub const GENERATE_SW: Task = Task::new("generate-service-worker", tasks::service_worker::run);
pub const PAGESPEED: Task = Task::new("pagespeed", tasks::pagespeed::run);

/// Full production build, service worker included.
pub fn production_plan() -> Plan {
    Plan {
        name: "production",
        stages: vec![
            Stage::single(CLEAN),
            Stage::parallel(vec![STYLES, FAVICON]),
            Stage::parallel(vec![LINT, HTML, SCRIPTS, IMAGES, COPY]),
            Stage::single(GENERATE_SW),
        ],
    }
}

/// Development build: no service worker, a stale one causes caching
/// headaches while iterating.
pub fn development_plan() -> Plan {
    Plan {
        name: "development",
        stages: vec![
            Stage::single(CLEAN),
            Stage::parallel(vec![STYLES, FAVICON]),
            Stage::parallel(vec![LINT, HTML, SCRIPTS, IMAGES, COPY]),
        ],
    }
}

/// Incremental rebuild for the watched areas; no clean, no service worker.
/// Stage boundaries carry the same ordering constraints as the full plans
/// (favicon before html, lint before scripts).
pub fn rebuild_plan(stages: Vec<Vec<Task>>) -> Plan {
    Plan {
        name: "rebuild",
        stages: stages.into_iter().map(Stage::parallel).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_sequences_sw_after_assets() {
        let names = production_plan().task_names();
        assert_eq!(names[0], vec!["clean"]);
        assert!(names[1].contains(&"styles"));
        assert!(names[1].contains(&"favicon"));
        assert_eq!(*names.last().unwrap(), vec!["generate-service-worker"]);
    }

    #[test]
    fn favicon_is_staged_before_html() {
        let names = production_plan().task_names();
        let favicon_stage = names.iter().position(|s| s.contains(&"favicon")).unwrap();
        let html_stage = names.iter().position(|s| s.contains(&"html")).unwrap();
        assert!(favicon_stage < html_stage);
    }

    #[test]
    fn rebuild_plan_preserves_stage_boundaries() {
        let names = rebuild_plan(vec![vec![FAVICON], vec![HTML]]).task_names();
        // favicon must finish before html renders; one parallel stage for
        // both would let html inject a half-written markup snippet.
        assert_eq!(names, vec![vec!["favicon"], vec!["html"]]);
    }

    #[test]
    fn development_skips_the_service_worker() {
        let names = development_plan().task_names();
        assert!(
            names
                .iter()
                .all(|stage| !stage.contains(&"generate-service-worker"))
        );
        // Everything else still runs.
        let flat: Vec<_> = names.into_iter().flatten().collect();
        for task in ["clean", "styles", "favicon", "lint", "html", "scripts", "images", "copy"] {
            assert!(flat.contains(&task), "missing task {}", task);
        }
    }
}
