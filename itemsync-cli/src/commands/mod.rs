pub mod compile;
pub mod formats;
pub mod plan;
pub mod state;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use itemsync_core::{manifest::load_manifests, settings, Diagnostics, ResourceManifest, Settings, Severity};
use itemsync_lifecycle::{KindRegistry, Planner};

/// Home directory and settings shared by commands that read state.
pub struct Env {
    pub home: PathBuf,
    pub settings: Settings,
}

impl Env {
    pub fn load(preview: bool) -> Result<Self> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let mut settings = settings::load_at(&home).context("failed to load settings")?;
        settings.preview |= preview;
        Ok(Self { home, settings })
    }
}

/// Manifests in `path`, with part sources resolved from its directory.
pub fn read_manifests(path: &Path) -> Result<(PathBuf, Vec<ResourceManifest>)> {
    let manifests =
        load_manifests(path).with_context(|| format!("failed to read manifests from {}", path.display()))?;
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((base, manifests))
}

pub fn planner_for(manifest: &ResourceManifest, base: &Path, settings: &Settings) -> Result<Planner> {
    let descriptor = KindRegistry::builtin()
        .require(&manifest.kind)
        .with_context(|| format!("'{}'", manifest.identity.display_name))?;
    let planner = Planner::new(descriptor, settings)
        .with_context(|| format!("invalid format table for {}", descriptor.name))?;
    Ok(planner.with_base_dir(base))
}

pub fn label(manifest: &ResourceManifest) -> String {
    format!("{} '{}'", manifest.kind, manifest.identity.display_name)
}

pub fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        let tag = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        match &diagnostic.path {
            Some(path) => println!("  {tag} [{path}] {}: {}", diagnostic.summary, diagnostic.detail),
            None => println!("  {tag} {}: {}", diagnostic.summary, diagnostic.detail),
        }
    }
}
