pub mod errors;

pub const NORESIZE_MARKER: &str = "-noresize";

pub const FAVICON_MARKUP_FILE: &str = "favicon.html";

pub const SERVICE_WORKER_FILE: &str = "service-worker.js";

/// Debounce window for the development watcher.
pub const WATCH_DEBOUNCE_MS: u64 = 300;

use std::sync::LazyLock;
use std::sync::atomic::AtomicU64;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::runtime::{Builder, Runtime};

pub static CURRENT_NUM_THREADS: LazyLock<usize> = LazyLock::new(|| rayon::current_num_threads());

// Rocket-specific Tokio Runtime
// This runtime is dedicated to the development server, with thread names clearly labeled.
pub static ROCKET_RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
    Builder::new_multi_thread()
        .worker_threads(*CURRENT_NUM_THREADS)
        .thread_name("rocket-io-worker")
        .enable_all()
        .build()
        .expect("Failed to build Rocket Tokio runtime")
});

// Rayon thread pool for the build stages
// Parallel stages fan out here instead of the global Rayon pool, so a build
// running inside `serve` does not interfere with other threads.
pub static WORKER_RAYON_POOL: LazyLock<ThreadPool> = LazyLock::new(|| {
    ThreadPoolBuilder::new()
        .num_threads(*CURRENT_NUM_THREADS)
        .thread_name(|i| format!("build-worker-{}", i))
        .build()
        .expect("Failed to build Worker Rayon pool")
});

/// Monotonic stamp bumped after every successful rebuild; exposed by the
/// development server at `/__build_stamp` for reload polling.
pub static BUILD_STAMP: AtomicU64 = AtomicU64::new(0);
