use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::Input;
use std::io::{self, BufRead, IsTerminal};
use std::path::Path;
use tracing::{info, warn};

use super::{execute, Flow, Session};

/// Reads commands until `exit` or end of input. Errors are reported and the
/// session carries on.
pub fn interactive(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let prompt_user = stdin.is_terminal();

    if prompt_user && !session.json {
        println!("{}", "svc session started".bold().cyan());
        println!(
            "   {}: {}",
            "Working directory".bold(),
            session.repo.backend().root().display()
        );
        println!("   {}: {}", "Branch".bold(), session.repo.active_branch());
        println!();
        println!("{}", "Type 'help' for commands, 'exit' to quit".dimmed());
        println!();
    }

    if prompt_user {
        loop {
            let prompt = format!("svc ({})", session.repo.active_branch());
            let line = match Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
            {
                Ok(line) => line,
                Err(e) => {
                    warn!("prompt closed: {e}");
                    break;
                }
            };
            if report(execute(session, &line)) == Flow::Exit {
                break;
            }
        }
    } else {
        for line in stdin.lock().lines() {
            let line = line.context("Failed to read command")?;
            if report(execute(session, &line)) == Flow::Exit {
                break;
            }
        }
    }

    info!("session ended");
    Ok(())
}

fn report(outcome: Result<Flow>) -> Flow {
    outcome.unwrap_or_else(|e| {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        Flow::Continue
    })
}

/// Runs a script of shell commands. Stops at the first failure unless
/// `keep_going` is set.
pub fn run_script(session: &mut Session, script: &Path, keep_going: bool) -> Result<()> {
    let content = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    run_lines(session, &content, keep_going)
}

pub fn run_lines(session: &mut Session, content: &str, keep_going: bool) -> Result<()> {
    let mut failures = 0;

    for (index, line) in content.lines().enumerate() {
        let number = index + 1;
        match execute(session, line) {
            Ok(Flow::Exit) => break,
            Ok(Flow::Continue) => {}
            Err(e) if keep_going => {
                failures += 1;
                eprintln!("{} line {number}: {:#}", "error:".red().bold(), e);
            }
            Err(e) => return Err(e.context(format!("line {number}: {}", line.trim()))),
        }
    }

    if failures > 0 {
        bail!("{failures} command(s) failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use svc_core::{DiskBackend, ErrorKind, Repository};
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        Session::new(Repository::init(DiskBackend::new(dir.path())), true)
    }

    #[test]
    fn test_script_commits_and_merges() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "base\n").unwrap();
        fs::write(temp_dir.path().join("feat.txt"), "feature\n").unwrap();
        let mut session = session(&temp_dir);

        run_lines(
            &mut session,
            "# set up\n\
             add a.txt\n\
             commit -m 'initial import'\n\
             branch feat\n\
             checkout feat\n\
             add feat.txt\n\
             commit -m feature\n\
             checkout master\n\
             merge feat\n",
            false,
        )
        .unwrap();

        let head = session.repo.head().unwrap().unwrap();
        assert_eq!(head.message(), "Merged branch feat");
        assert!(head.is_merge());
        assert_eq!(session.repo.active_branch(), "master");
        assert_eq!(session.repo.history().unwrap().len(), 2);
    }

    #[test]
    fn test_script_stops_at_first_failure() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        let mut session = session(&temp_dir);

        let err = run_lines(&mut session, "add a.txt\nadd a.txt\ncommit -m never\n", false)
            .unwrap_err();

        assert!(format!("{err:#}").contains("line 2"));
        let cause = err.root_cause().downcast_ref::<svc_core::Error>().unwrap();
        assert_eq!(cause.kind(), ErrorKind::Conflict);
        assert!(session.repo.head().unwrap().is_none());
    }

    #[test]
    fn test_script_keep_going() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        let mut session = session(&temp_dir);

        let err = run_lines(&mut session, "checkout nope\nadd a.txt\ncommit -m first\n", true)
            .unwrap_err();

        assert!(err.to_string().contains("1 command(s) failed"));
        assert!(session.repo.head().unwrap().is_some());
    }

    #[test]
    fn test_exit_stops_script() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        let mut session = session(&temp_dir);

        run_lines(&mut session, "add a.txt\nexit\ncommit -m skipped\n", false).unwrap();
        assert!(session.repo.head().unwrap().is_none());
        assert_eq!(session.repo.tracked_files().len(), 1);
    }

    #[test]
    fn test_unknown_command_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = session(&temp_dir);

        assert!(execute(&mut session, "frobnicate").is_err());
        assert_eq!(execute(&mut session, "   ").unwrap(), Flow::Continue);
    }
}
