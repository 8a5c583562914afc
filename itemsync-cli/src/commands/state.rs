//! `itemsync state list|show|forget`

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use itemsync_core::{state, ImportId, ResourceState};

use super::Env;

#[derive(Subcommand, Debug)]
pub enum StateCommand {
    /// List every recorded item.
    List(ListArgs),

    /// Print one record as JSON.
    Show(KeyArgs),

    /// Drop a record without touching the remote item.
    Forget(KeyArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// `<workspaceID>/<itemID>`
    pub key: String,
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "display name")]
    display_name: String,
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "parts")]
    parts: usize,
    #[tabled(rename = "updates")]
    updates: &'static str,
    #[tabled(rename = "applied")]
    applied: String,
}

pub fn run(cmd: StateCommand, env: &Env) -> Result<()> {
    match cmd {
        StateCommand::List(args) => list(env, args),
        StateCommand::Show(args) => show(env, args),
        StateCommand::Forget(args) => forget(env, args),
    }
}

fn list(env: &Env, args: ListArgs) -> Result<()> {
    let records = state::list_at(&env.home).context("failed to load state")?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&records).context("failed to serialize state")?
        );
        return Ok(());
    }
    if records.is_empty() {
        println!("No items recorded.");
        return Ok(());
    }

    let now = Utc::now();
    let rows: Vec<StateRow> = records
        .iter()
        .map(|r| StateRow {
            kind: r.kind.clone(),
            display_name: r.identity.display_name.to_string(),
            id: format!("{}/{}", r.workspace_id, r.id),
            parts: r.definition.as_ref().map_or(0, |d| d.parts.len()),
            updates: if r.definition_update_enabled { "enabled" } else { "pinned" },
            applied: format_age(r.applied_at, now),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn show(env: &Env, args: KeyArgs) -> Result<()> {
    let key = parse_key(&args.key)?;
    let Some(record) = state::load_at::<serde_json::Value>(&env.home, &key.workspace_id, &key.item_id)
        .context("failed to load state")?
    else {
        bail!("no record for {key}");
    };
    print_record(&record)
}

fn forget(env: &Env, args: KeyArgs) -> Result<()> {
    let key = parse_key(&args.key)?;
    state::remove_at(&env.home, &key.workspace_id, &key.item_id).context("failed to remove state")?;
    tracing::info!(key = %key, "record removed");
    println!("Forgot {key}.");
    Ok(())
}

fn parse_key(raw: &str) -> Result<ImportId> {
    raw.parse()
        .with_context(|| format!("invalid key '{raw}', expected <workspaceID>/<itemID>"))
}

fn print_record(record: &ResourceState) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(record).context("failed to serialize state")?
    );
    Ok(())
}

fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn age_picks_largest_unit() {
        let now = Utc::now();
        assert_eq!(format_age(now, now), "0s ago");
        assert_eq!(format_age(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_age(now - Duration::hours(30), now), "1d ago");
        assert_eq!(format_age(now + Duration::minutes(1), now), "0s ago");
    }

    #[test]
    fn keys_must_be_two_uuids() {
        assert!(parse_key("not-a-key").is_err());
        assert!(parse_key("0b1a6c34-2f0e-4c1d-9b7e-5d3f1e2a4c68/3c5e7a9b-1d2f-4a6c-8e0b-2f4d6a8c0e1a").is_ok());
    }
}
