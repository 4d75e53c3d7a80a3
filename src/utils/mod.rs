use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use filetime::FileTime;
use log::info;

pub trait PathExt {
    fn ext_lower(&self) -> String;
}

impl PathExt for Path {
    fn ext_lower(&self) -> String {
        self.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// True when `dest` is missing or older than `src`.
pub fn newer(src: &Path, dest: &Path) -> Result<bool> {
    let dest_meta = match fs::metadata(dest) {
        Ok(meta) => meta,
        Err(_) => return Ok(true),
    };
    let src_meta =
        fs::metadata(src).context(format!("failed to read metadata for source {:?}", src))?;
    let src_mtime = FileTime::from_last_modification_time(&src_meta);
    let dest_mtime = FileTime::from_last_modification_time(&dest_meta);
    Ok(src_mtime > dest_mtime)
}

/// Create the parent directory tree of `path` if it does not exist yet.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .context(format!("failed to create directory tree {:?}", parent))?;
    }
    Ok(())
}

/// Convert a path relative to `base` into a `/`-separated URL path.
/// Glob matching and the precache manifest always use `/`, never `path::sep`.
pub fn rel_url(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let mut url = String::new();
    for component in rel.components() {
        if !url.is_empty() {
            url.push('/');
        }
        url.push_str(&component.as_os_str().to_string_lossy());
    }
    Some(url)
}

pub fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "kB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Per-task output accounting: file count and byte total, with optional
/// per-file lines.
pub struct SizeReport {
    title: &'static str,
    show_files: bool,
    total: u64,
    files: usize,
}

impl SizeReport {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            show_files: false,
            total: 0,
            files: 0,
        }
    }

    pub fn show_files(title: &'static str) -> Self {
        Self {
            title,
            show_files: true,
            total: 0,
            files: 0,
        }
    }

    pub fn add(&mut self, path: &Path, bytes: u64) {
        self.total += bytes;
        self.files += 1;
        if self.show_files {
            info!("{}: {} {}", self.title, path.display(), human_size(bytes));
        }
    }

    pub fn finish(self) {
        info!(
            "{}: {} file(s), {} total",
            self.title,
            self.files,
            human_size(self.total)
        );
    }
}

/// Copy `src` to `dest`, creating parent directories, and return the byte count.
pub fn copy_file(src: &Path, dest: &Path) -> Result<u64> {
    ensure_parent(dest)?;
    fs::copy(src, dest).context(format!("failed to copy {:?} to {:?}", src, dest))
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<u64> {
    ensure_parent(path)?;
    let bytes = contents.as_ref();
    fs::write(path, bytes).context(format!("failed to write {:?}", path))?;
    Ok(bytes.len() as u64)
}

pub fn output_path(out_dir: &Path, base: &Path, src: &Path) -> PathBuf {
    match src.strip_prefix(base) {
        Ok(rel) => out_dir.join(rel),
        Err(_) => out_dir.join(src),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn ext_lower_normalizes_case() {
        assert_eq!(Path::new("photo.JPG").ext_lower(), "jpg");
        assert_eq!(Path::new("no_extension").ext_lower(), "");
    }

    #[test]
    fn newer_is_true_for_missing_dest() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.scss");
        File::create(&src).unwrap().write_all(b"x").unwrap();
        assert!(newer(&src, &dir.path().join("missing.css")).unwrap());
    }

    #[test]
    fn newer_is_false_for_up_to_date_dest() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.scss");
        let dest = dir.path().join("a.css");
        File::create(&src).unwrap().write_all(b"x").unwrap();
        File::create(&dest).unwrap().write_all(b"y").unwrap();
        // Push the destination mtime past the source.
        let later = FileTime::from_unix_time(FileTime::now().unix_seconds() + 60, 0);
        filetime::set_file_mtime(&dest, later).unwrap();
        assert!(!newer(&src, &dest).unwrap());
    }

    #[test]
    fn rel_url_uses_forward_slashes() {
        let base = Path::new("dist");
        let path = Path::new("dist").join("images").join("pic.jpg");
        assert_eq!(rel_url(base, &path).unwrap(), "images/pic.jpg");
    }

    #[test]
    fn rel_url_rejects_foreign_paths() {
        assert_eq!(rel_url(Path::new("dist"), Path::new("app/x.js")), None);
    }

    #[test]
    fn human_size_scales_units() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(12_340), "12.34 kB");
        assert_eq!(human_size(3_500_000), "3.50 MB");
    }

    #[test]
    fn output_path_preserves_relative_structure() {
        let out = output_path(
            Path::new("dist/images"),
            Path::new("app/images"),
            Path::new("app/images/gallery/pic.png"),
        );
        assert_eq!(out, PathBuf::from("dist/images/gallery/pic.png"));
    }
}
