//! `itemsync validate <manifest>`: run every kind rule without touching state.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use itemsync_lifecycle::LifecycleError;

use super::{label, planner_for, print_diagnostics, read_manifests, Env};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Manifest file; may hold several `---` separated documents.
    pub manifest: PathBuf,
}

impl ValidateArgs {
    pub fn run(self, env: &Env) -> Result<()> {
        let (base, manifests) = read_manifests(&self.manifest)?;
        let mut failed = 0usize;

        for manifest in &manifests {
            let planner = planner_for(manifest, &base, &env.settings)?;
            match planner.preflight(manifest) {
                Ok(warnings) => {
                    println!("{} {}", "✓".green(), label(manifest));
                    print_diagnostics(&warnings);
                }
                Err(LifecycleError::Configuration(diagnostics)) => {
                    failed += 1;
                    println!("{} {}", "✗".red(), label(manifest));
                    print_diagnostics(&diagnostics);
                }
                Err(err) => {
                    failed += 1;
                    println!("{} {}: {err}", "✗".red(), label(manifest));
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {} manifest(s) failed validation", manifests.len());
        }
        Ok(())
    }
}
