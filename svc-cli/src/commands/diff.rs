use anyhow::{bail, Result};
use colored::Colorize;
use svc_core::{ChangeKind, DiffLine, DiffLineType};

use super::Session;
use crate::display::print_json;

pub fn run(session: &Session, commit_id: Option<&str>, context: usize) -> Result<()> {
    let repo = &session.repo;
    let commit = match commit_id {
        Some(id) => repo.lookup_commit(id)?,
        None => match repo.head()? {
            Some(head) => head,
            None => bail!("Branch '{}' has no commits yet", repo.active_branch()),
        },
    };
    let diffs = repo.diff_commit(commit.id().as_str())?;

    if session.json {
        let patches: Vec<_> = diffs
            .iter()
            .map(|d| {
                serde_json::json!({
                    "path": d.path,
                    "kind": d.kind,
                    "additions": d.additions(),
                    "deletions": d.deletions(),
                    "patch": d.format_unified(context),
                })
            })
            .collect();
        return print_json(&patches);
    }

    println!("{}", format!("Diff for commit {}", commit.id()).bold().cyan());
    println!("{}: {}", "Message".bold(), commit.message());
    println!();

    for diff in &diffs {
        println!("{}", "━".repeat(80).bright_black());

        let status = match diff.kind {
            ChangeKind::Addition => "NEW".green(),
            ChangeKind::Modification { .. } => "MOD".yellow(),
            ChangeKind::Deletion => "DEL".red(),
        };
        println!(
            "{} {} {}",
            status,
            diff.path.white().bold(),
            format!("(+{} -{})", diff.additions(), diff.deletions()).dimmed()
        );
        println!();

        if diff.binary {
            println!("  {}", "[Binary file]".dimmed());
            println!();
            continue;
        }

        for line in visible_lines(&diff.diff_lines, context) {
            let Some(line) = line else {
                println!("{}", "   ⋮".dimmed());
                continue;
            };
            let (prefix, color): (&str, fn(&str) -> colored::ColoredString) =
                match line.line_type {
                    DiffLineType::Addition => ("+", |s| s.green()),
                    DiffLineType::Deletion => ("-", |s| s.red()),
                    DiffLineType::Context => (" ", |s| s.normal()),
                };
            println!(
                "{} {} {}",
                line_number(line.old_line_number).dimmed(),
                line_number(line.new_line_number).dimmed(),
                color(&format!("{prefix}{}", line.content.trim_end_matches('\n')))
            );
        }
        println!();
    }

    Ok(())
}

fn line_number(number: Option<usize>) -> String {
    number.map_or_else(|| " ".repeat(4), |n| format!("{n:>4}"))
}

/// Lines within `context` of a change, in order. `None` stands for a run of
/// skipped context lines.
fn visible_lines(lines: &[DiffLine], context: usize) -> Vec<Option<&DiffLine>> {
    let changed: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.line_type != DiffLineType::Context)
        .map(|(i, _)| i)
        .collect();

    let mut visible = Vec::new();
    let mut skipping = false;
    for (i, line) in lines.iter().enumerate() {
        if changed.iter().any(|&c| c.abs_diff(i) <= context) {
            visible.push(Some(line));
            skipping = false;
        } else if !skipping {
            visible.push(None);
            skipping = true;
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use svc_core::{Change, FileDiff};

    fn numbered(lines: &[&str]) -> Vec<u8> {
        lines.iter().map(|l| format!("{l}\n")).collect::<String>().into_bytes()
    }

    #[test]
    fn test_visible_lines_keep_context_around_changes() {
        let old = numbered(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
        let new = numbered(&["1", "2", "3", "4", "five", "6", "7", "8", "9", "10"]);
        let change = Change::addition("n.txt");
        let diff = FileDiff::from_change(&change, Some(&old[..]), Some(&new[..]));

        let visible = visible_lines(&diff.diff_lines, 1);
        let rendered: Vec<_> = visible
            .iter()
            .map(|l| l.map(|l| l.content.trim_end().to_string()))
            .collect();

        assert_eq!(
            rendered,
            vec![
                None,
                Some("4".to_string()),
                Some("5".to_string()),
                Some("five".to_string()),
                Some("6".to_string()),
                None,
            ]
        );
        assert_eq!(visible[2].unwrap().old_line_number, Some(5));
        assert_eq!(visible[3].unwrap().new_line_number, Some(5));
    }

    #[test]
    fn test_visible_lines_without_changes() {
        let text = numbered(&["same"]);
        let change = Change::addition("s.txt");
        let diff = FileDiff::from_change(&change, Some(&text[..]), Some(&text[..]));
        assert_eq!(visible_lines(&diff.diff_lines, 3).len(), 1);
        assert!(visible_lines(&diff.diff_lines, 3)[0].is_none());
    }

    #[test]
    fn test_line_number_padding() {
        assert_eq!(line_number(Some(7)), "   7");
        assert_eq!(line_number(None), "    ");
    }
}
