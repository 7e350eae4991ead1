use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

use super::Session;
use crate::display::print_json;

pub fn list(session: &Session) -> Result<()> {
    let repo = &session.repo;
    let active = repo.active_branch();

    if session.json {
        return print_json(&json!({
            "active": active,
            "branches": repo.list_branches(),
        }));
    }

    for name in repo.list_branches() {
        if name == active {
            println!("{} {}", "*".green(), name.green().bold());
        } else {
            println!("  {name}");
        }
    }
    Ok(())
}

pub fn create(session: &mut Session, name: &str) -> Result<()> {
    session
        .repo
        .create_branch(name)
        .with_context(|| format!("Failed to create branch '{name}'"))?;

    if session.json {
        return print_json(&json!({ "created": name }));
    }
    println!(
        "{} {} from {}",
        "✓ Created branch".green(),
        name.bold(),
        session.repo.active_branch()
    );
    Ok(())
}

pub fn checkout(session: &mut Session, name: &str) -> Result<()> {
    session
        .repo
        .checkout(name)
        .with_context(|| format!("Failed to check out '{name}'"))?;

    if session.json {
        return print_json(&json!({ "active": name }));
    }
    println!("{} {}", "✓ Switched to branch".green(), name.bold());
    Ok(())
}
