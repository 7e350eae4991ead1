use anyhow::{bail, Result};
use colored::Colorize;

use super::Session;
use crate::display::{commit_report, print_json};

pub fn run(session: &Session, limit: Option<usize>) -> Result<()> {
    let repo = &session.repo;
    let commits = repo.history()?;
    let to_show = limit.unwrap_or(commits.len()).min(commits.len());

    if session.json {
        return print_json(&commits[..to_show]);
    }

    if commits.is_empty() {
        println!("{}", "No commits yet".yellow());
        return Ok(());
    }

    println!(
        "{} {}",
        "Commit History".bold().cyan(),
        format!("({})", repo.active_branch()).dimmed()
    );
    println!();

    for commit in commits.iter().take(to_show) {
        println!(
            "{} {}",
            "commit".yellow().bold(),
            commit.id().to_string().yellow()
        );
        if commit.is_merge() {
            let parents = repo.parents(commit)?;
            let parents: Vec<_> = parents.iter().map(|id| id.as_str()).collect();
            println!("{}: {}", "Merge".bold(), parents.join(" "));
        }
        println!(
            "{}: {}",
            "Date".bold(),
            commit.timestamp().format("%Y-%m-%d %H:%M:%S")
        );
        println!();
        println!("    {}", commit.message());
        println!();
        println!(
            "    {} file(s) changed",
            commit.changes().len().to_string().cyan()
        );
        for change in commit.changes().iter().take(5) {
            println!("      • {}", change.file_name.dimmed());
        }
        if commit.changes().len() > 5 {
            println!(
                "      {} and {} more...",
                "...".dimmed(),
                (commit.changes().len() - 5).to_string().dimmed()
            );
        }
        println!();
    }

    if commits.len() > to_show {
        println!(
            "{}",
            format!("... and {} more commits", commits.len() - to_show).dimmed()
        );
        println!("Use {} to see more", "--limit N".cyan());
    }

    Ok(())
}

/// Prints one commit, or the active head when `commit_id` is omitted.
pub fn show(session: &Session, commit_id: Option<&str>) -> Result<()> {
    let repo = &session.repo;
    let commit = match commit_id {
        Some(id) => repo.lookup_commit(id)?,
        None => match repo.head()? {
            Some(head) => head,
            None => bail!("Branch '{}' has no commits yet", repo.active_branch()),
        },
    };

    if session.json {
        return print_json(commit);
    }
    print!("{}", commit_report(repo, commit));
    Ok(())
}
