use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

use super::Session;
use crate::display::print_json;

pub fn add(session: &mut Session, path: &str) -> Result<()> {
    let fingerprint = session
        .repo
        .add(path)
        .with_context(|| format!("Failed to add {path}"))?;

    if session.json {
        return print_json(&json!({ "added": path, "fingerprint": fingerprint }));
    }
    println!("{} {} [{}]", "✓ Tracking".green(), path.bold(), fingerprint.to_string().dimmed());
    Ok(())
}

pub fn remove(session: &mut Session, path: &str) -> Result<()> {
    let fingerprint = session
        .repo
        .remove(path)
        .with_context(|| format!("Failed to remove {path}"))?;

    if session.json {
        return print_json(&json!({ "removed": path, "fingerprint": fingerprint }));
    }
    println!("{} {} [{}]", "✓ Untracked".green(), path.bold(), fingerprint.to_string().dimmed());
    Ok(())
}

pub fn hash(session: &Session, path: &str) -> Result<()> {
    let fingerprint = session.repo.fingerprint_file(path)?;

    if session.json {
        return print_json(&json!({ "path": path, "fingerprint": fingerprint }));
    }
    println!("{fingerprint}  {path}");
    Ok(())
}
