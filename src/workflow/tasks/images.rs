//! Images task - emit the responsive breakpoint set for every raster asset
//!
//! Resizing itself belongs to the `image` crate; this task only decides which
//! variants exist and what they are called. Sources carrying the `-noresize`
//! marker and non-raster files (svg etc.) are copied through untouched.
//! Breakpoints wider than the source are skipped rather than enlarged.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use log::debug;
use rayon::prelude::*;
use regex::Regex;
use walkdir::WalkDir;

use crate::common::NORESIZE_MARKER;
use crate::config::responsive::{Breakpoint, ResponsiveConfig};
use crate::utils::{copy_file, ensure_parent, human_size, output_path};
use crate::workflow::BuildContext;

static RASTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpe?g|png|webp)$").unwrap());

fn is_raster(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| RASTER_PATTERN.is_match(name))
        .unwrap_or(false)
}

fn is_noresize(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| stem.contains(NORESIZE_MARKER))
        .unwrap_or(false)
}

fn format_for(path: &Path) -> ImageFormat {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => ImageFormat::Png,
        Some("webp") => ImageFormat::WebP,
        _ => ImageFormat::Jpeg,
    }
}

/// Resize `source` for one breakpoint. Returns `None` when the breakpoint
/// would enlarge the source and enlargement is disabled; with
/// `error_on_enlargement` set a too-small source fails the task instead.
fn render_variant(
    source: &DynamicImage,
    breakpoint: &Breakpoint,
    responsive: &ResponsiveConfig,
) -> Result<Option<DynamicImage>> {
    let Some(width) = breakpoint.width else {
        return Ok(Some(source.clone()));
    };
    if responsive.without_enlargement && width > source.width() {
        if responsive.error_on_enlargement {
            bail!(
                "breakpoint {} ({}px) would enlarge a {}px-wide source",
                breakpoint.suffix,
                width,
                source.width()
            );
        }
        return Ok(None);
    }
    let variant = match breakpoint.height {
        // Square-ish thumb: cover-resize then center-crop.
        Some(height) => source.resize_to_fill(width, height, FilterType::Lanczos3),
        None => {
            let height =
                ((width as u64 * source.height() as u64) / source.width() as u64).max(1) as u32;
            source.resize_exact(width, height, FilterType::Lanczos3)
        }
    };
    Ok(Some(variant))
}

fn process_raster(ctx: &BuildContext, src: &Path, dest: &Path) -> Result<u64> {
    let source = image::open(src).context(format!("failed to decode image {:?}", src))?;
    let responsive = &ctx.config.responsive;
    let mut total = 0u64;

    for breakpoint in &responsive.breakpoints {
        let Some(variant) = render_variant(&source, breakpoint, responsive)
            .context(format!("failed to process image {:?}", src))?
        else {
            debug!(
                "Skipping {:?}{} (source is {}px wide).",
                src,
                breakpoint.suffix,
                source.width()
            );
            continue;
        };
        let out = breakpoint.rename(dest);
        ensure_parent(&out)?;
        // RGB8 before JPEG: the encoder rejects alpha channels.
        let format = format_for(&out);
        match format {
            ImageFormat::Jpeg => variant
                .to_rgb8()
                .save_with_format(&out, format)
                .context(format!("failed to save variant {:?}", out))?,
            _ => variant
                .save_with_format(&out, format)
                .context(format!("failed to save variant {:?}", out))?,
        }
        total += std::fs::metadata(&out).map(|m| m.len()).unwrap_or(0);
    }

    Ok(total)
}

pub fn run(ctx: &BuildContext) -> Result<()> {
    let images_dir = ctx.config.images_dir();
    if !images_dir.exists() {
        return Ok(());
    }

    let dist_images = ctx.config.dist_dir.join("images");
    let files: Vec<_> = WalkDir::new(&images_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    let total: u64 = files
        .par_iter()
        .map(|src| -> Result<u64> {
            let dest = output_path(&dist_images, &images_dir, src);
            if is_raster(src) && !is_noresize(src) {
                process_raster(ctx, src, &dest)
            } else if ctx.config.responsive.pass_through_unused {
                copy_file(src, &dest)
            } else {
                Ok(0)
            }
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))?;

    log::info!("images: {} total", human_size(total));

    Ok(())
}
