//! Html task - render pages, inject favicon markup, minify
//!
//! Every `.tera` page outside `root/` and `templates/` is rendered with the
//! `siteinfo` global plus its own `<page>.json` sidecar, renamed to `.html`,
//! and minified. Favicon markup generated by the favicon task is injected at
//! the `</head>` boundary, which is why favicon is ordered before html.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tera::Tera;
use walkdir::WalkDir;

use crate::BuildConfig;
use crate::utils::{SizeReport, rel_url, write_file};
use crate::workflow::BuildContext;

fn is_page(config: &BuildConfig, path: &Path) -> bool {
    if path.extension().and_then(|s| s.to_str()) != Some("tera") {
        return false;
    }
    let excluded = [config.root_dir(), config.templates_dir()];
    !excluded.iter().any(|dir| path.starts_with(dir))
}

fn sidecar_for(page: &Path) -> PathBuf {
    page.with_extension("json")
}

fn load_sidecar(page: &Path) -> Result<Value> {
    let sidecar = sidecar_for(page);
    let raw = fs::read_to_string(&sidecar).map_err(|_| {
        anyhow!(
            "missing JSON sidecar {:?} for page {:?}",
            sidecar,
            page
        )
    })?;
    serde_json::from_str(&raw).context(format!("failed to parse sidecar {:?}", sidecar))
}

/// Insert the favicon markup just before `</head>`. Pages without a head are
/// left untouched.
fn inject_favicon(html: &str, markup: &str) -> String {
    match html.find("</head>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + markup.len());
            out.push_str(&html[..pos]);
            out.push_str(markup);
            out.push_str(&html[pos..]);
            out
        }
        None => html.to_string(),
    }
}

pub fn run(ctx: &BuildContext) -> Result<()> {
    let app_dir = &ctx.config.app_dir;
    if !app_dir.exists() {
        return Ok(());
    }
    let pattern = format!("{}/**/*.tera", app_dir.display());
    let tera = Tera::new(&pattern).context("failed to load templates")?;

    let favicon_markup = fs::read_to_string(ctx.config.favicon_markup()).ok();
    let cfg = ctx.config.htmlmin.to_cfg();
    let mut report = SizeReport::show_files("html");

    for entry in WalkDir::new(app_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_page(&ctx.config, entry.path()) {
            continue;
        }

        let name = rel_url(app_dir, entry.path())
            .ok_or_else(|| anyhow!("page {:?} escapes {:?}", entry.path(), app_dir))?;

        let mut context = tera::Context::new();
        context.insert("siteinfo", &ctx.siteinfo);
        context.insert("page", &load_sidecar(entry.path())?);

        let rendered = tera
            .render(&name, &context)
            .context(format!("failed to render page {:?}", entry.path()))?;

        let html = match &favicon_markup {
            Some(markup) => inject_favicon(&rendered, markup),
            None => rendered,
        };
        let minified = minify_html::minify(html.as_bytes(), &cfg);

        let dest = ctx
            .config
            .dist_dir
            .join(Path::new(&name).with_extension("html"));
        let bytes = write_file(&dest, &minified)?;
        report.add(&dest, bytes);
    }
    report.finish();

    Ok(())
}
