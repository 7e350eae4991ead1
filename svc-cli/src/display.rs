use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use svc_core::{Change, ChangeKind, Commit, FileBackend, Repository};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn change_icon(kind: &ChangeKind) -> ColoredString {
    match kind {
        ChangeKind::Addition => "+".green(),
        ChangeKind::Deletion => "-".red(),
        ChangeKind::Modification { .. } => "/".yellow(),
    }
}

/// `+ name`, `- name` or `/ name [before -> after]`.
pub fn change_line(change: &Change) -> String {
    match change.kind {
        ChangeKind::Addition => format!("{} {}", change_icon(&change.kind), change.file_name),
        ChangeKind::Deletion => format!("{} {}", change_icon(&change.kind), change.file_name),
        ChangeKind::Modification { before, after } => format!(
            "{} {} [{} -> {}]",
            change_icon(&change.kind),
            change.file_name,
            before.to_string().dimmed(),
            after.to_string().dimmed()
        ),
    }
}

/// The full commit report: header, change lines, then the tracked snapshot.
pub fn commit_report<B: FileBackend>(repo: &Repository<B>, commit: &Commit) -> String {
    let branch = repo.branches().get(commit.branch()).name();
    let mut out = format!(
        "{} [{}]: {}\n",
        commit.id().to_string().yellow(),
        branch.as_str().cyan(),
        commit.message()
    );

    for change in commit.changes() {
        out.push_str(&format!("    {}\n", change_line(change)));
    }
    out.push('\n');

    out.push_str(&format!("    Tracked files ({}):\n", commit.files().len()));
    for file in commit.files() {
        out.push_str(&format!(
            "    [{}] {}\n",
            file.fingerprint.to_string().dimmed(),
            file.name
        ));
    }
    out
}
