//! Development server - serve the build output and rebuild on change
//!
//! Rocket serves `.tmp` and `dist` (cache first, matching the original serve
//! order); the watcher thread reruns the affected tasks when sources change.
//! `/__build_stamp` exposes a counter that bumps after every rebuild so a
//! client can poll for reloads.

pub mod watcher;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::Result;
use log::{error, info};
use rocket::fs::FileServer;
use tokio::sync::broadcast;

use crate::common::{BUILD_STAMP, ROCKET_RUNTIME};
use crate::workflow::BuildContext;

#[get("/__build_stamp")]
fn build_stamp() -> String {
    BUILD_STAMP.load(Ordering::SeqCst).to_string()
}

fn build_rocket(ctx: &BuildContext) -> rocket::Rocket<rocket::Build> {
    let figment = rocket::Config::figment()
        .merge(("port", ctx.config.port))
        .merge(("shutdown.ctrlc", false));

    // Cache tree first, output tree second.
    rocket::custom(figment)
        .mount("/", routes![build_stamp])
        .mount("/", FileServer::from(&ctx.config.tmp_dir).rank(10))
        .mount("/", FileServer::from(&ctx.config.dist_dir).rank(11))
}

/// Serve the site and watch for changes until ctrl-c.
pub fn serve(ctx: BuildContext) -> Result<()> {
    let ctx = Arc::new(ctx);
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let stop = Arc::new(AtomicBool::new(false));

    // The clean task may have removed the mounted directories.
    std::fs::create_dir_all(&ctx.config.tmp_dir)?;
    std::fs::create_dir_all(&ctx.config.dist_dir)?;

    info!(
        "Serving {:?} and {:?} on port {}.",
        ctx.config.tmp_dir, ctx.config.dist_dir, ctx.config.port
    );

    ROCKET_RUNTIME.spawn({
        let shutdown_tx = shutdown_tx.clone();
        let stop = stop.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.store(true, Ordering::SeqCst);
                let _ = shutdown_tx.send(());
            }
        }
    });

    let watcher_handle = thread::spawn({
        let ctx = ctx.clone();
        let stop = stop.clone();
        let shutdown_tx = shutdown_tx.clone();
        move || {
            if let Err(e) = watcher::watch_loop(&ctx, &stop) {
                error!("Watcher failed: {:?}", e);
                let _ = shutdown_tx.send(());
            }
        }
    });

    let rocket_handle = thread::spawn({
        let ctx = ctx.clone();
        let shutdown_tx = shutdown_tx.clone();
        let stop = stop.clone();
        move || {
            let result = ROCKET_RUNTIME.block_on(async {
                let rocket_instance = build_rocket(&ctx).ignite().await?;
                let shutdown_handle = rocket_instance.shutdown();
                let shutdown_tx_clone = shutdown_tx.clone();
                ROCKET_RUNTIME.spawn(async move {
                    let mut shutdown_rx = shutdown_tx_clone.subscribe();
                    if shutdown_rx.recv().await.is_ok() {
                        shutdown_handle.notify();
                    }
                });
                rocket_instance.launch().await
            });
            if let Err(e) = result {
                error!("Development server failed: {}", e);
                stop.store(true, Ordering::SeqCst);
                return Err(anyhow::Error::from(e));
            }
            Ok(())
        }
    });

    watcher_handle.join().expect("Watcher thread panicked");
    let _ = rocket_handle.join().expect("Server thread panicked");

    Ok(())
}
