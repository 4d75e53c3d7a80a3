//! Favicon task - generate the icon set, webmanifest and markup snippet
//!
//! From the master picture (`app/favicon.png`) this produces the classic
//! favicons, android-chrome icons, apple-touch icons on a solid background
//! with a margin, `site.webmanifest`, and the HTML markup consumed by the
//! html task. Icons are regenerated only when the master changed.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result, bail};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use serde_json::json;

use crate::utils::{SizeReport, newer, write_file};
use crate::workflow::BuildContext;

pub const MANIFEST_NAME: &str = "site.webmanifest";

/// Parse `#rrggbb` into a pixel. Short `#rgb` form is expanded.
fn parse_hex(color: &str) -> Result<Rgba<u8>> {
    let hex = color.trim_start_matches('#');
    let expanded = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => hex.to_string(),
        _ => bail!("invalid hex color {:?}", color),
    };
    let value =
        u32::from_str_radix(&expanded, 16).context(format!("invalid hex color {:?}", color))?;
    Ok(Rgba([
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
        255,
    ]))
}

/// Apple-touch icon: the picture centered on a solid background with a
/// margin fraction on every side.
fn apple_icon(master: &DynamicImage, size: u32, margin: f32, background: Rgba<u8>) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(size, size, background);
    let margin_px = ((size as f32) * margin).round() as u32;
    let inner = size.saturating_sub(2 * margin_px).max(1);
    let picture = master.resize(inner, inner, FilterType::Lanczos3).to_rgba8();
    let x = (size - picture.width()) / 2;
    let y = (size - picture.height()) / 2;
    imageops::overlay(&mut canvas, &picture, x as i64, y as i64);
    canvas
}

fn webmanifest(ctx: &BuildContext) -> serde_json::Value {
    let favicon = &ctx.config.favicon;
    let name = favicon
        .app_name
        .clone()
        .unwrap_or_else(|| ctx.siteinfo.name_or_default().to_string());
    let icons: Vec<_> = [192u32, 512]
        .iter()
        .filter(|size| favicon.android_sizes.contains(*size))
        .map(|size| {
            json!({
                "src": format!("/android-chrome-{0}x{0}.png{1}", size, favicon.version_query()),
                "sizes": format!("{0}x{0}", size),
                "type": "image/png",
            })
        })
        .collect();
    json!({
        "name": name,
        "short_name": name,
        "description": favicon.app_description,
        "developer": {
            "name": favicon.developer_name,
            "url": favicon.developer_url,
        },
        "lang": favicon.lang,
        "icons": icons,
        "theme_color": favicon.theme_color,
        "background_color": favicon.background,
        "display": favicon.display,
        "orientation": favicon.orientation,
        "start_url": favicon.start_url,
    })
}

fn markup(ctx: &BuildContext) -> String {
    let favicon = &ctx.config.favicon;
    let v = favicon.version_query();
    let mut out = String::new();
    for size in &favicon.classic_sizes {
        let _ = writeln!(
            out,
            "<link rel=\"icon\" type=\"image/png\" sizes=\"{0}x{0}\" href=\"/favicon-{0}x{0}.png{1}\">",
            size, v
        );
    }
    if let Some(size) = favicon.apple_sizes.iter().max() {
        let _ = writeln!(
            out,
            "<link rel=\"apple-touch-icon\" sizes=\"{0}x{0}\" href=\"/apple-touch-icon-{0}x{0}.png{1}\">",
            size, v
        );
    }
    let _ = writeln!(out, "<link rel=\"manifest\" href=\"/{}{}\">", MANIFEST_NAME, v);
    let _ = writeln!(
        out,
        "<meta name=\"theme-color\" content=\"{}\">",
        favicon.theme_color
    );
    out
}

pub fn run(ctx: &BuildContext) -> Result<()> {
    let master_path = ctx.config.favicon_master();
    if !master_path.exists() {
        return Ok(());
    }
    let markup_path = ctx.config.favicon_markup();
    if !newer(&master_path, &markup_path)? {
        return Ok(());
    }

    let master = image::open(&master_path)
        .context(format!("failed to decode favicon master {:?}", master_path))?;
    let favicon = &ctx.config.favicon;
    let background = parse_hex(&favicon.background)?;
    let dist = &ctx.config.dist_dir;
    let mut report = SizeReport::new("favicon");

    // Upscaling a small master is deliberate; a too-small picture is not an
    // error.
    for size in &favicon.classic_sizes {
        let icon = master.resize_exact(*size, *size, FilterType::Lanczos3);
        let path = dist.join(format!("favicon-{0}x{0}.png", size));
        save_png(&icon.to_rgba8(), &path, &mut report)?;
    }
    for size in &favicon.android_sizes {
        let icon = master.resize_exact(*size, *size, FilterType::Lanczos3);
        let path = dist.join(format!("android-chrome-{0}x{0}.png", size));
        save_png(&icon.to_rgba8(), &path, &mut report)?;
    }
    for size in &favicon.apple_sizes {
        let icon = apple_icon(&master, *size, favicon.apple_margin, background);
        let path = dist.join(format!("apple-touch-icon-{0}x{0}.png", size));
        save_png(&icon, &path, &mut report)?;
    }

    let manifest = serde_json::to_string_pretty(&webmanifest(ctx))?;
    let bytes = write_file(&dist.join(MANIFEST_NAME), &manifest)?;
    report.add(&dist.join(MANIFEST_NAME), bytes);

    write_file(&markup_path, markup(ctx))?;
    report.finish();

    Ok(())
}

fn save_png(icon: &RgbaImage, path: &Path, report: &mut SizeReport) -> Result<()> {
    crate::utils::ensure_parent(path)?;
    icon.save(path)
        .context(format!("failed to save icon {:?}", path))?;
    let bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    report.add(path, bytes);
    Ok(())
}
