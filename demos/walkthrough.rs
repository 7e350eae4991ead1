use std::fs;

use svc::{DiskBackend, Repository, Resolution};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("svc walkthrough\n");

    let workdir = tempfile::tempdir()?;
    let root = workdir.path();
    let mut repo = Repository::init(DiskBackend::new(root));
    println!("✓ Repository ready in {}", root.display());
    println!();

    println!("📝 Tracking README.md and src/lib.rs");
    fs::create_dir_all(root.join("src"))?;
    fs::write(root.join("README.md"), "# Demo\n")?;
    fs::write(root.join("src/lib.rs"), "pub fn answer() -> u32 { 41 }\n")?;
    repo.add("README.md")?;
    repo.add("src/lib.rs")?;

    let base = repo.commit("Initial import")?.ok_or("nothing to commit")?;
    println!("✓ Commit created: {base}");
    println!();

    println!("🌿 Branching off 'fix'");
    repo.create_branch("fix")?;
    repo.checkout("fix")?;
    fs::write(root.join("src/lib.rs"), "pub fn answer() -> u32 { 42 }\n")?;
    let fix = repo.commit("Fix the answer")?.ok_or("nothing to commit")?;
    println!("✓ Commit created on fix: {fix}");
    println!();

    println!("🔀 Back on master, editing the README");
    repo.checkout("master")?;
    fs::write(root.join("README.md"), "# Demo\n\nNow with docs.\n")?;
    fs::write(root.join("NOTES.md"), "merged by hand\n")?;
    repo.commit("Document the demo")?;

    let merged = repo
        .merge("fix", &[Resolution::new("README.md", "NOTES.md")])?
        .ok_or("merge had nothing to commit")?;
    let commit = repo.lookup_commit(merged.as_str())?;
    let parents: Vec<_> = repo.parents(commit)?.iter().map(|p| p.to_string()).collect();
    println!("✓ Merge commit {merged} with parents [{}]", parents.join(", "));
    println!();

    println!("📜 History of {}:", repo.active_branch());
    for commit in repo.history()? {
        println!("  {} {}", commit.id(), commit.message());
    }
    println!();

    println!("⏪ Resetting to {base}");
    repo.reset(base.as_str())?;
    println!("  src/lib.rs: {}", fs::read_to_string(root.join("src/lib.rs"))?.trim());

    let report = repo.teardown();
    println!();
    println!(
        "✓ Released {} commits, {} blobs, {} branches",
        report.commits, report.blobs, report.branches
    );

    Ok(())
}
