//! `itemsync compile <manifest>`: resolve sources, apply processing, and show
//! what would be sent for each part.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use itemsync_compiler::Compiler;
use itemsync_core::ItemDefinition;

use super::{label, read_manifests};

#[derive(Args, Debug)]
pub struct CompileArgs {
    pub manifest: PathBuf,

    /// Print compiled definitions, payloads included, as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct CompiledJson<'a> {
    kind: &'a str,
    display_name: &'a str,
    definition: Option<ItemDefinition>,
}

#[derive(Tabled)]
struct PartRow {
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "mode")]
    mode: String,
    #[tabled(rename = "fingerprint")]
    fingerprint: String,
}

impl CompileArgs {
    pub fn run(self) -> Result<()> {
        let (base, manifests) = read_manifests(&self.manifest)?;
        let compiler = Compiler::new(&base);

        let mut compiled = Vec::with_capacity(manifests.len());
        for manifest in &manifests {
            let definition = manifest
                .definition
                .as_ref()
                .map(|config| compiler.compile_definition(config))
                .transpose()
                .with_context(|| format!("failed to compile {}", label(manifest)))?;
            compiled.push(CompiledJson {
                kind: &manifest.kind,
                display_name: manifest.identity.display_name.as_str(),
                definition,
            });
        }

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&compiled).context("failed to serialize definitions")?
            );
            return Ok(());
        }

        for item in compiled {
            println!("{} '{}'", item.kind, item.display_name);
            let Some(definition) = item.definition else {
                println!("  no definition");
                continue;
            };
            if let Some(format) = &definition.format {
                println!("  format: {format}");
            }
            let rows: Vec<PartRow> = definition
                .parts
                .iter()
                .map(|(path, part)| PartRow {
                    path: path.clone(),
                    source: part.part.source.display().to_string(),
                    mode: part.part.processing_mode.to_string(),
                    fingerprint: part.fingerprint.as_str().chars().take(12).collect(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }
        Ok(())
    }
}
