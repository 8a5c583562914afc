//! `itemsync plan <manifest>`: compare manifests with recorded state.
//!
//! A manifest is matched to a record by kind, workspace and display name.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use itemsync_core::{state, ResourceManifest, ResourceState};
use itemsync_drift::PartChange;
use itemsync_lifecycle::{Plan, PlanAction};

use super::{label, planner_for, print_diagnostics, read_manifests, Env};

#[derive(Args, Debug)]
pub struct PlanArgs {
    pub manifest: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PlanJson<'a> {
    kind: &'a str,
    display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    plan: Plan,
}

impl PlanArgs {
    pub fn run(self, env: &Env) -> Result<()> {
        let (base, manifests) = read_manifests(&self.manifest)?;
        let records = state::list_at(&env.home).context("failed to load state")?;

        let mut plans = Vec::with_capacity(manifests.len());
        for manifest in &manifests {
            let planner = planner_for(manifest, &base, &env.settings)?;
            let prior = find_record(&records, manifest);
            tracing::debug!(kind = %manifest.kind, managed = prior.is_some(), "planning");
            let plan = planner
                .plan(prior, manifest)
                .with_context(|| format!("cannot plan {}", label(manifest)))?;
            plans.push(PlanJson {
                kind: &manifest.kind,
                display_name: manifest.identity.display_name.as_str(),
                id: prior.map(|p| p.id.to_string()),
                plan,
            });
        }

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plans).context("failed to serialize plan")?
            );
            return Ok(());
        }

        let changes = plans.iter().filter(|p| p.plan.action != PlanAction::NoOp).count();
        for item in &plans {
            print_plan(item);
        }
        println!("Plan: {changes} to change, {} unchanged.", plans.len() - changes);
        Ok(())
    }
}

fn find_record<'a>(records: &'a [ResourceState], manifest: &ResourceManifest) -> Option<&'a ResourceState> {
    records.iter().find(|r| {
        r.kind.eq_ignore_ascii_case(&manifest.kind)
            && r.workspace_id == manifest.workspace_id
            && r.identity.display_name == manifest.identity.display_name
    })
}

fn print_plan(item: &PlanJson<'_>) {
    let plan = &item.plan;
    let marker = match plan.action {
        PlanAction::Create => "+ create".green().bold(),
        PlanAction::Update => "~ update".yellow().bold(),
        PlanAction::NoOp => "  no changes".bright_black(),
    };
    println!("{marker} {} '{}'", item.kind, item.display_name);

    if let Some(identity) = &plan.identity {
        println!("    display_name: {}", identity.display_name);
        println!("    description:  {}", identity.description);
    }
    if let Some(folder) = &plan.folder {
        println!("    folder_id:    {}", folder.as_deref().unwrap_or("(workspace root)"));
    }
    if let Some(reason) = &plan.reason {
        println!("    definition:   {reason:?}");
    }
    for diff in &plan.diffs {
        match &diff.change {
            PartChange::Added => println!("    {} {}", "+".green(), diff.path),
            PartChange::Removed => println!("    {} {}", "-".red(), diff.path),
            PartChange::Unchanged => {}
            PartChange::Modified { unified_diff } => {
                println!("    {} {}", "~".yellow(), diff.path);
                match unified_diff {
                    Some(text) if !text.is_empty() => {
                        for line in text.lines() {
                            println!("      {line}");
                        }
                    }
                    Some(_) => println!("      (processing inputs changed)"),
                    None => println!("      (binary content changed)"),
                }
            }
        }
    }
    print_diagnostics(&plan.diagnostics);
}
