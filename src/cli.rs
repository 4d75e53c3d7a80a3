//! Command-line surface: one subcommand per task, `build` by default.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "puggle", version, about = "Static-site build tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Build the production site (default).
    Build,
    /// Build the development site (no service worker).
    Development,
    /// Build, serve and rebuild on file changes.
    Serve,
    /// Remove the output directory and build cache.
    Clean,
    /// Lint the client scripts.
    Lint,
    /// Compile and minify stylesheets.
    Styles,
    /// Concatenate and minify client scripts.
    Scripts,
    /// Resize and emit responsive image variants.
    Images,
    /// Render, inject favicon markup and minify pages.
    Html,
    /// Copy not-to-be-processed root files.
    Copy,
    /// Generate the favicon set and markup snippet.
    Favicon,
    /// Generate the service worker with its precache manifest.
    GenerateSw,
    /// Query PageSpeed Insights for the configured URL.
    Pagespeed,
}
