use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

use super::Session;
use crate::display::{change_line, print_json};

pub fn run(session: &mut Session, message: &str) -> Result<()> {
    let Some(id) = session
        .repo
        .commit(message)
        .context("Failed to create commit")?
    else {
        if session.json {
            return print_json(&json!({ "commit": null }));
        }
        println!("{}", "No changes to commit".yellow());
        return Ok(());
    };

    let commit = session.repo.lookup_commit(id.as_str())?;

    if session.json {
        return print_json(commit);
    }

    println!("{}", "✓ Commit created successfully!".green().bold());
    println!("  {}: {}", "Commit ID".bold(), id);
    println!("  {}: {}", "Branch".bold(), session.repo.active_branch());
    println!("  {}: {}", "Message".bold(), message);
    println!("  {}: {}", "Files changed".bold(), commit.changes().len());
    for change in commit.changes() {
        println!("    {}", change_line(change));
    }

    Ok(())
}
