//! Service-worker task - precache manifest generation
//!
//! Runs after all asset tasks: the runtime-caching support scripts are
//! copied into the output tree, then every asset matching the configured
//! glob set is listed in the precache manifest with a content-hash revision
//! (blake3, first 8 bytes). URLs are `/`-separated regardless of platform.

use std::fs;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::common::SERVICE_WORKER_FILE;
use crate::utils::{SizeReport, copy_file, output_path, rel_url, write_file};
use crate::workflow::BuildContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecacheEntry {
    pub url: String,
    pub revision: String,
}

pub fn revision_for(contents: &[u8]) -> String {
    blake3::hash(contents).to_hex()[..16].to_string()
}

/// Copy the scripts pulled in via `importScripts` (the toolbox must be
/// served next to the worker).
pub fn copy_sw_scripts(ctx: &BuildContext) -> Result<()> {
    let sw_dir = ctx.config.scripts_dir().join("sw");
    if !sw_dir.exists() {
        return Ok(());
    }
    let dest_dir = ctx.config.dist_dir.join("scripts").join("sw");
    for entry in WalkDir::new(&sw_dir) {
        let entry = entry?;
        if entry.file_type().is_file() {
            copy_file(entry.path(), &output_path(&dest_dir, &sw_dir, entry.path()))?;
        }
    }
    Ok(())
}

/// Collect the precache entries for every matching file under `dist`.
pub fn collect_entries(ctx: &BuildContext) -> Result<Vec<PrecacheEntry>> {
    let dist = &ctx.config.dist_dir;
    let glob_set = ctx.config.sw.glob_set()?;
    let mut entries = Vec::new();

    for entry in WalkDir::new(dist).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(rel) = rel_url(dist, entry.path()) else {
            continue;
        };
        // The worker itself never precaches itself.
        if rel == SERVICE_WORKER_FILE || rel.starts_with(".git/") {
            continue;
        }
        if !glob_set.is_match(&rel) {
            continue;
        }
        let contents = fs::read(entry.path())
            .context(format!("failed to read asset {:?}", entry.path()))?;
        entries.push(PrecacheEntry {
            url: format!("/{}", rel),
            revision: revision_for(&contents),
        });
    }

    Ok(entries)
}

fn worker_source(ctx: &BuildContext, entries: &[PrecacheEntry]) -> String {
    let cache_id = ctx
        .config
        .sw
        .cache_id
        .clone()
        .unwrap_or_else(|| ctx.siteinfo.name_or_default().to_string());

    let manifest = entries
        .iter()
        .map(|e| format!("  [{:?}, {:?}]", e.url, e.revision))
        .collect::<Vec<_>>()
        .join(",\n");

    let imports = ctx
        .config
        .sw
        .import_scripts
        .iter()
        .map(|s| format!("{:?}", s))
        .collect::<Vec<_>>()
        .join(", ");

    // The caching strategy below is the precaching library's standard
    // install/activate/fetch triple; only the manifest and ids are ours.
    format!(
        r#"'use strict';
importScripts({imports});

var CACHE_NAME = '{cache_id}-precache';
var PRECACHE = [
{manifest}
];

self.addEventListener('install', function (event) {{
  event.waitUntil(
    caches.open(CACHE_NAME).then(function (cache) {{
      return cache.addAll(PRECACHE.map(function (entry) {{
        return entry[0] + '?_rev=' + entry[1];
      }}));
    }}).then(function () {{
      return self.skipWaiting();
    }})
  );
}});

self.addEventListener('activate', function (event) {{
  event.waitUntil(
    caches.keys().then(function (names) {{
      return Promise.all(names.filter(function (name) {{
        return name !== CACHE_NAME;
      }}).map(function (name) {{
        return caches.delete(name);
      }}));
    }}).then(function () {{
      return self.clients.claim();
    }})
  );
}});

self.addEventListener('fetch', function (event) {{
  if (event.request.method !== 'GET') {{
    return;
  }}
  event.respondWith(
    caches.match(event.request, {{ignoreSearch: true}}).then(function (cached) {{
      return cached || fetch(event.request);
    }})
  );
}});
"#
    )
}

pub fn run(ctx: &BuildContext) -> Result<()> {
    copy_sw_scripts(ctx)?;

    let entries = collect_entries(ctx)?;
    let source = worker_source(ctx, &entries);
    let dest = ctx.config.dist_dir.join(SERVICE_WORKER_FILE);
    let bytes = write_file(&dest, &source)?;

    let mut report = SizeReport::new("generate-service-worker");
    report.add(&dest, bytes);
    report.finish();
    log::info!("Precache manifest lists {} asset(s).", entries.len());

    Ok(())
}
