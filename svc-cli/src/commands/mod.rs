pub mod branch;
pub mod commit;
pub mod diff;
pub mod log;
pub mod merge;
pub mod reset;
pub mod shell;
pub mod status;
pub mod track;

use anyhow::{bail, Result};
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::Colorize;
use svc_core::{DiskBackend, Repository, Resolution};

/// One repository for the life of the process, plus output preferences.
pub struct Session {
    pub repo: Repository<DiskBackend>,
    pub json: bool,
}

impl Session {
    pub fn new(repo: Repository<DiskBackend>, json: bool) -> Self {
        Self { repo, json }
    }

    /// Tears the repository down and reports what was released.
    pub fn finish(self) {
        let report = self.repo.teardown();
        if !self.json {
            println!(
                "{}",
                format!(
                    "Session closed: {} commit(s), {} blob(s), {} branch(es) released",
                    report.commits, report.blobs, report.branches
                )
                .dimmed()
            );
        }
    }
}

/// A single line typed at the prompt or read from a script.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "svc", disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ShellCommand {
    /// Start tracking a file
    Add { path: String },

    /// Stop tracking a file (the file stays on disk)
    Rm { path: String },

    /// Commit the active branch's changes
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Show uncommitted changes
    Status,

    /// Show the active branch's history
    Log {
        /// Number of commits to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show a commit's changes and tracked files
    Show {
        /// Commit ID (defaults to the active head)
        commit_id: Option<String>,
    },

    /// Show line diffs for a commit against its first parent
    Diff {
        commit_id: Option<String>,

        /// Lines of context around each hunk
        #[arg(short = 'U', long, default_value = "3")]
        context: usize,
    },

    /// List branches, or create one from the active branch
    Branch { name: Option<String> },

    /// Switch to another branch
    Checkout { name: String },

    /// Move the active branch to a commit
    Reset { commit_id: String },

    /// Merge a branch into the active branch
    Merge {
        branch: String,

        /// Replace FILE with the content of PATH
        #[arg(long = "resolve", value_name = "FILE=PATH", value_parser = parse_resolution)]
        resolve: Vec<Resolution>,

        /// Drop FILE from the merged result
        #[arg(long = "drop", value_name = "FILE")]
        drop: Vec<String>,
    },

    /// Print the fingerprint of a file on disk
    Hash { path: String },

    /// End the session
    #[command(alias = "quit")]
    Exit,
}

/// Whether the session should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

fn parse_resolution(arg: &str) -> std::result::Result<Resolution, String> {
    match arg.split_once('=') {
        Some((file, _)) if file.is_empty() => Err("FILE must not be empty".to_string()),
        Some((file, path)) => Ok(Resolution::new(file, path)),
        None => Err(format!("expected FILE=PATH, got '{arg}'")),
    }
}

/// Splits a command line on whitespace, honouring single and double quotes.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(q) = quote {
        bail!("Unterminated {q} quote");
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Parses and runs one line. Blank lines and `#` comments do nothing.
pub fn execute(session: &mut Session, line: &str) -> Result<Flow> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Flow::Continue);
    }

    let tokens = tokenize(trimmed)?;
    let matches = match ShellLine::command().try_get_matches_from(tokens) {
        Ok(matches) => matches,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                print!("{e}");
                return Ok(Flow::Continue);
            }
            bail!("{}", e.render().to_string().trim_end());
        }
    };

    let parsed = ShellLine::from_arg_matches(&matches)?;
    dispatch(session, parsed.command, &matches)
}

fn dispatch(session: &mut Session, command: ShellCommand, matches: &ArgMatches) -> Result<Flow> {
    match command {
        ShellCommand::Add { path } => track::add(session, &path)?,
        ShellCommand::Rm { path } => track::remove(session, &path)?,
        ShellCommand::Hash { path } => track::hash(session, &path)?,
        ShellCommand::Commit { message } => commit::run(session, &message)?,
        ShellCommand::Status => status::run(session)?,
        ShellCommand::Log { limit } => log::run(session, limit)?,
        ShellCommand::Show { commit_id } => log::show(session, commit_id.as_deref())?,
        ShellCommand::Diff { commit_id, context } => {
            diff::run(session, commit_id.as_deref(), context)?
        }
        ShellCommand::Branch { name: None } => branch::list(session)?,
        ShellCommand::Branch { name: Some(name) } => branch::create(session, &name)?,
        ShellCommand::Checkout { name } => branch::checkout(session, &name)?,
        ShellCommand::Reset { commit_id } => reset::run(session, &commit_id)?,
        ShellCommand::Merge {
            branch,
            resolve,
            drop,
        } => {
            let Some(sub) = matches.subcommand_matches("merge") else {
                bail!("merge arguments missing");
            };
            let resolutions = resolutions_in_order(sub, resolve, drop);
            merge::run(session, &branch, &resolutions)?
        }
        ShellCommand::Exit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

/// `--resolve` and `--drop` values interleaved in command-line order.
fn resolutions_in_order(
    matches: &ArgMatches,
    resolve: Vec<Resolution>,
    drop: Vec<String>,
) -> Vec<Resolution> {
    let resolve_at = matches.indices_of("resolve").into_iter().flatten();
    let drop_at = matches.indices_of("drop").into_iter().flatten();

    let mut ordered: Vec<(usize, Resolution)> = resolve_at
        .zip(resolve)
        .chain(drop_at.zip(drop.into_iter().map(Resolution::drop_file)))
        .collect();
    ordered.sort_by_key(|(index, _)| *index);
    ordered.into_iter().map(|(_, resolution)| resolution).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(line: &str) -> ShellCommand {
        ShellLine::try_parse_from(tokenize(line).unwrap())
            .unwrap()
            .command
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize(r#"commit -m "first commit"  "#).unwrap(),
            vec!["commit", "-m", "first commit"]
        );
        assert_eq!(
            tokenize("add 'my file.txt'").unwrap(),
            vec!["add", "my file.txt"]
        );
        assert_eq!(tokenize("commit -m ''").unwrap(), vec!["commit", "-m", ""]);
        assert!(tokenize("commit -m \"oops").is_err());
    }

    #[test]
    fn test_parse_commit() {
        assert_eq!(
            parse("commit -m 'initial import'"),
            ShellCommand::Commit {
                message: "initial import".to_string()
            }
        );
    }

    #[test]
    fn test_parse_merge_resolutions() {
        let command = parse("merge feat --resolve a.txt=fixed/a.txt --resolve b.txt= --drop c.txt");

        let ShellCommand::Merge {
            branch,
            resolve,
            drop,
        } = command
        else {
            panic!("expected merge");
        };

        assert_eq!(branch, "feat");
        assert_eq!(resolve[0].resolved_path, Some(PathBuf::from("fixed/a.txt")));
        assert!(resolve[1].replacement().is_none());
        assert_eq!(drop, vec!["c.txt"]);
    }

    fn merge_resolutions(line: &str) -> Vec<Resolution> {
        let matches = ShellLine::command()
            .try_get_matches_from(tokenize(line).unwrap())
            .unwrap();
        let ShellCommand::Merge { resolve, drop, .. } =
            ShellLine::from_arg_matches(&matches).unwrap().command
        else {
            panic!("expected merge");
        };
        resolutions_in_order(matches.subcommand_matches("merge").unwrap(), resolve, drop)
    }

    #[test]
    fn test_merge_resolutions_keep_command_line_order() {
        assert_eq!(
            merge_resolutions("merge feat --drop a.txt --resolve a.txt=x"),
            vec![Resolution::drop_file("a.txt"), Resolution::new("a.txt", "x")]
        );
        assert_eq!(
            merge_resolutions("merge feat --resolve a.txt=x --drop a.txt"),
            vec![Resolution::new("a.txt", "x"), Resolution::drop_file("a.txt")]
        );
        assert_eq!(
            merge_resolutions("merge feat --resolve a=1 --drop b --resolve c=2"),
            vec![
                Resolution::new("a", "1"),
                Resolution::drop_file("b"),
                Resolution::new("c", "2"),
            ]
        );
        assert!(merge_resolutions("merge feat").is_empty());
    }

    #[test]
    fn test_parse_resolution_rejects_bad_input() {
        assert!(parse_resolution("no-equals").is_err());
        assert!(parse_resolution("=path").is_err());
    }

    #[test]
    fn test_parse_branch_and_exit() {
        assert_eq!(parse("branch"), ShellCommand::Branch { name: None });
        assert_eq!(
            parse("branch feat/x"),
            ShellCommand::Branch {
                name: Some("feat/x".to_string())
            }
        );
        assert_eq!(parse("quit"), ShellCommand::Exit);
    }
}
