use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::Session;
use crate::display::{change_line, print_json};

pub fn run(session: &Session) -> Result<()> {
    let repo = &session.repo;
    let changes = repo.status()?;

    if session.json {
        return print_json(&json!({
            "branch": repo.active_branch(),
            "head": repo.head()?.map(|c| c.id()),
            "tracked": repo.tracked_files().len(),
            "changes": changes,
        }));
    }

    println!("{}", "Session Status".bold().cyan());
    println!("  {}: {}", "Root".bold(), repo.backend().root().display());
    println!("  {}: {}", "Branch".bold(), repo.active_branch());
    match repo.head()? {
        Some(head) => println!(
            "  {}: {} ({})",
            "Head".bold(),
            head.id(),
            head.timestamp().format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("  {}: {}", "Head".bold(), "no commits yet".dimmed()),
    }
    println!("  {}: {}", "Tracked files".bold(), repo.tracked_files().len());
    println!();

    if changes.is_empty() {
        println!("{}", "No uncommitted changes".green());
        return Ok(());
    }

    println!(
        "{} {}",
        "Uncommitted changes:".bold(),
        format!("({})", changes.len()).yellow()
    );
    println!();
    for change in &changes {
        println!("  {}", change_line(change));
    }
    println!();
    println!(
        "Run {} to commit these changes",
        "commit -m \"message\"".cyan()
    );

    Ok(())
}
