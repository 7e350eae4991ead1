use anyhow::{Context, Result};
use colored::Colorize;
use svc_core::ChangeKind;

use super::Session;
use crate::display::print_json;

/// Moves the active branch to `commit_id` and restores its files.
pub fn run(session: &mut Session, commit_id: &str) -> Result<()> {
    // Pending work that the reset is about to overwrite or untrack.
    let pending = session.repo.status()?;

    session
        .repo
        .reset(commit_id)
        .with_context(|| format!("Failed to reset to {commit_id}"))?;

    let commit = session.repo.lookup_commit(commit_id)?;
    if session.json {
        return print_json(commit);
    }

    println!("{}", "✓ Reset complete".green().bold());
    println!("  {}: {}", "Branch".bold(), session.repo.active_branch());
    println!("  {}: {}", "Target Commit".bold(), commit.id());
    println!("  {}: {}", "Message".bold(), commit.message());
    println!(
        "  {}: {}",
        "Date".bold(),
        commit.timestamp().format("%Y-%m-%d %H:%M:%S")
    );
    println!("  {}: {}", "Files restored".bold(), commit.files().len());

    if !pending.is_empty() {
        println!();
        println!("{}", "Discarded uncommitted changes:".yellow());
        for change in &pending {
            let status = match change.kind {
                ChangeKind::Addition => "no longer tracked".red(),
                ChangeKind::Modification { .. } => "restored".yellow(),
                ChangeKind::Deletion => "restored".green(),
            };
            println!("  {} {}", change.file_name, status);
        }
    }

    Ok(())
}
