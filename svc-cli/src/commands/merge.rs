use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use svc_core::Resolution;

use super::Session;
use crate::display::{change_line, print_json};

pub fn run(session: &mut Session, branch: &str, resolutions: &[Resolution]) -> Result<()> {
    let into = session.repo.active_branch().to_string();
    let merged = session
        .repo
        .merge(branch, resolutions)
        .with_context(|| format!("Failed to merge '{branch}' into '{into}'"))?;

    let Some(id) = merged else {
        if session.json {
            return print_json(&json!({ "commit": null }));
        }
        println!("{}", "Already up to date, nothing to commit".yellow());
        return Ok(());
    };

    let commit = session.repo.lookup_commit(id.as_str())?;
    if session.json {
        return print_json(commit);
    }

    println!("{}", "✓ Merge successful".green().bold());
    println!("  {}: {} -> {}", "Branches".bold(), branch, into);
    println!("  {}: {}", "Commit ID".bold(), id);
    let parents = session.repo.parents(commit)?;
    let parents: Vec<_> = parents.iter().map(|p| p.as_str()).collect();
    println!("  {}: {}", "Parents".bold(), parents.join(", "));
    for change in commit.changes() {
        println!("    {}", change_line(change));
    }
    for resolution in resolutions {
        match resolution.replacement() {
            Some(path) => println!(
                "  {} {} from {}",
                "resolved".cyan(),
                resolution.file_name,
                path.display()
            ),
            None => println!("  {} {}", "dropped".red(), resolution.file_name),
        }
    }

    Ok(())
}
