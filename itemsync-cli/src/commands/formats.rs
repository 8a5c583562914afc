//! `itemsync formats`: the built-in kinds and the paths each format allows.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use itemsync_lifecycle::{KindDescriptor, KindRegistry};

#[derive(Args, Debug)]
pub struct FormatsArgs {
    /// Only show this item type.
    pub kind: Option<String>,
}

#[derive(Tabled)]
struct FormatRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "format")]
    format: String,
    #[tabled(rename = "wire format")]
    wire_format: String,
    #[tabled(rename = "paths")]
    paths: String,
}

impl FormatsArgs {
    pub fn run(self) -> Result<()> {
        let registry = KindRegistry::builtin();
        let kinds: Vec<&KindDescriptor> = match &self.kind {
            Some(kind) => vec![registry.require(kind).context("see `itemsync formats` for known kinds")?],
            None => registry.iter().collect(),
        };

        let mut rows = Vec::new();
        for kind in kinds {
            let kind_label = if kind.is_preview {
                format!("{} (preview)", kind.item_type)
            } else {
                kind.item_type.to_string()
            };
            if kind.formats.is_empty() {
                rows.push(FormatRow {
                    kind: kind_label,
                    format: "-".into(),
                    wire_format: "-".into(),
                    paths: "-".into(),
                });
                continue;
            }
            for format in kind.formats {
                rows.push(FormatRow {
                    kind: kind_label.clone(),
                    format: format.format_type.to_string(),
                    wire_format: format.wire_format.unwrap_or("(omitted)").to_string(),
                    paths: format.paths.join("\n"),
                });
            }
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
