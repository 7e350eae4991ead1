//! Folding one branch into the active branch.
//!
//! A merge copies every file the source branch tracks into the active working
//! set and onto disk, then applies caller-supplied resolutions on top, and
//! finally records an ordinary commit that gets the source head attached as its
//! second parent.

use std::path::Path;

use tracing::{debug, info};

use crate::backend::FileBackend;
use crate::error::{Error, Result};
use crate::hash;
use crate::models::{CommitId, Resolution, TrackedFile};
use crate::repository::{require_non_empty, Repository};

impl<B: FileBackend> Repository<B> {
    /// Merges `branch_name` into the active branch.
    ///
    /// Returns the merge commit's id, or `None` when the merged tree matches
    /// the active head and nothing was committed.
    pub fn merge(
        &mut self,
        branch_name: &str,
        resolutions: &[Resolution],
    ) -> Result<Option<CommitId>> {
        let source = self
            .branches()
            .find(branch_name)
            .ok_or_else(|| Error::BranchNotFound(branch_name.to_string()))?;
        if source == self.branches().active_id() {
            return Err(Error::SelfMerge(branch_name.to_string()));
        }
        for resolution in resolutions {
            require_non_empty(&resolution.file_name, "resolution file name")?;
        }
        self.ensure_clean()?;
        self.ensure_not_unborn()?;

        let source_branch = self.branches().get(source);
        let source_head = source_branch.head();
        let incoming: Vec<TrackedFile> = source_branch.working_set().snapshot();

        info!(
            from = branch_name,
            into = %self.active_branch(),
            files = incoming.len(),
            resolutions = resolutions.len(),
            "merging branch"
        );

        for file in incoming {
            let bytes = self.store().get(file.blob)?.to_vec();
            self.write_file(Path::new(&file.name), &bytes)?;
            debug!(file = %file.name, blob = %file.blob, "merged file");
            self.branches_mut().active_mut().working_set.upsert(file);
        }

        for resolution in resolutions {
            self.apply_resolution(resolution)?;
        }

        let message = format!("Merged branch {branch_name}");
        let Some(handle) = self.commit_handle(&message)? else {
            info!(from = branch_name, "merge produced no changes");
            return Ok(None);
        };

        if let Some(second) = source_head {
            self.graph_mut().attach_second_parent(handle, second)?;
        }

        let id = self.graph().get(handle)?.id().clone();
        info!(%id, from = branch_name, "merge committed");
        Ok(Some(id))
    }

    fn apply_resolution(&mut self, resolution: &Resolution) -> Result<()> {
        let name = resolution.file_name.as_str();

        let Some(path) = resolution.replacement() else {
            self.branches_mut().active_mut().working_set.remove(name);
            debug!(file = name, "resolution dropped file");
            return Ok(());
        };

        let bytes = self.read_file(path)?;
        let fingerprint = hash::fingerprint(name, &bytes);
        let len = bytes.len();
        self.write_file(Path::new(name), &bytes)?;
        let blob = self.store_mut().append(bytes);

        self.branches_mut().active_mut().working_set.upsert(TrackedFile {
            name: name.to_string(),
            fingerprint,
            blob,
            len,
        });

        debug!(file = name, resolved = %path.display(), %fingerprint, "resolution applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::MemoryBackend;
    use crate::error::{Error, ErrorKind};
    use crate::models::{Change, Resolution};
    use crate::repository::Repository;

    fn repo() -> Repository<MemoryBackend> {
        Repository::init(MemoryBackend::new())
    }

    fn write(repo: &mut Repository<MemoryBackend>, name: &str, content: &str) {
        repo.backend_mut().insert(name, content);
    }

    /// `master` with `a.txt`, plus a `feat` branch forked from it.
    fn forked() -> Repository<MemoryBackend> {
        let mut repo = repo();
        write(&mut repo, "a.txt", "base\n");
        repo.add("a.txt").unwrap();
        repo.commit("base").unwrap().unwrap();
        repo.create_branch("feat").unwrap();
        repo
    }

    fn tracked(repo: &Repository<MemoryBackend>) -> Vec<&str> {
        repo.tracked_files().iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_self_merge_rejected() {
        let mut repo = forked();
        let head = repo.head().unwrap().unwrap().id().clone();

        let err = repo.merge("master", &[]).unwrap_err();
        assert!(matches!(err, Error::SelfMerge(_)));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(repo.head().unwrap().unwrap().id(), &head);
        assert_eq!(repo.graph().len(), 1);
    }

    #[test]
    fn test_unknown_branch() {
        let mut repo = forked();
        assert_eq!(
            repo.merge("nope", &[]).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_dirty_target_rejected_before_mutation() {
        let mut repo = forked();
        repo.checkout("feat").unwrap();
        write(&mut repo, "f.txt", "f");
        repo.add("f.txt").unwrap();
        repo.commit("feature").unwrap().unwrap();
        repo.checkout("master").unwrap();

        write(&mut repo, "a.txt", "edited\n");
        let err = repo.merge("feat", &[]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Dirty);
        assert_eq!(tracked(&repo), vec!["a.txt"]);
        assert!(repo.backend().get("f.txt").is_some());
        assert_eq!(repo.graph().len(), 2);
    }

    #[test]
    fn test_disjoint_merge_has_two_parents() {
        let mut repo = forked();

        repo.checkout("feat").unwrap();
        write(&mut repo, "feat.txt", "feature\n");
        repo.add("feat.txt").unwrap();
        let feat_head = repo.commit("feature").unwrap().unwrap();

        repo.checkout("master").unwrap();
        write(&mut repo, "main.txt", "main\n");
        repo.add("main.txt").unwrap();
        let master_head = repo.commit("main work").unwrap().unwrap();

        // Files only the other branch tracks stay on disk across checkout.
        repo.backend_mut().remove("feat.txt");

        let id = repo.merge("feat", &[]).unwrap().unwrap();
        let merge = repo.lookup_commit(id.as_str()).unwrap();

        assert_eq!(merge.message(), "Merged branch feat");
        assert!(merge.is_merge());
        assert_eq!(repo.parents(merge).unwrap(), vec![&master_head, &feat_head]);
        assert_eq!(tracked(&repo), vec!["a.txt", "main.txt", "feat.txt"]);
        assert_eq!(repo.backend().get("feat.txt"), Some(&b"feature\n"[..]));
        assert!(!repo.is_dirty().unwrap());
    }

    #[test]
    fn test_merge_commit_is_child_of_first_parent_only() {
        let mut repo = forked();
        repo.checkout("feat").unwrap();
        write(&mut repo, "f.txt", "f");
        repo.add("f.txt").unwrap();
        repo.commit("feature").unwrap().unwrap();
        repo.checkout("master").unwrap();

        let id = repo.merge("feat", &[]).unwrap().unwrap();
        let handle = repo.graph().lookup(id.as_str()).unwrap();
        let merge = repo.graph().get(handle).unwrap();
        let feat_head = repo.graph().get(merge.parent_handles()[1]).unwrap();

        assert!(!feat_head.child_handles().contains(&handle));
        let first = repo.graph().get(merge.parent_handles()[0]).unwrap();
        assert!(first.child_handles().contains(&handle));
        assert_eq!(repo.graph().post_order().len(), repo.graph().len());
    }

    #[test]
    fn test_overlap_takes_source_content() {
        let mut repo = forked();

        repo.checkout("feat").unwrap();
        write(&mut repo, "a.txt", "from feat\n");
        repo.commit("feat edit").unwrap().unwrap();

        repo.checkout("master").unwrap();
        write(&mut repo, "b.txt", "b\n");
        repo.add("b.txt").unwrap();
        repo.commit("master edit").unwrap().unwrap();

        let id = repo.merge("feat", &[]).unwrap().unwrap();

        assert_eq!(repo.backend().get("a.txt"), Some(&b"from feat\n"[..]));
        let merged = repo.lookup_commit(id.as_str()).unwrap().file("a.txt").unwrap();
        assert_eq!(repo.store().get(merged.blob).unwrap(), b"from feat\n");
    }

    #[test]
    fn test_drop_resolution_untracks_without_touching_disk() {
        let mut repo = forked();

        repo.checkout("feat").unwrap();
        write(&mut repo, "x.txt", "x\n");
        repo.add("x.txt").unwrap();
        repo.commit("add x").unwrap().unwrap();
        repo.checkout("master").unwrap();

        let id = repo
            .merge("feat", &[Resolution::drop_file("x.txt")])
            .unwrap();

        // Nothing left to merge once x.txt is dropped.
        assert!(id.is_none());
        assert_eq!(tracked(&repo), vec!["a.txt"]);
        assert_eq!(repo.backend().get("x.txt"), Some(&b"x\n"[..]));
    }

    #[test]
    fn test_empty_path_resolution_drops() {
        let mut repo = forked();

        repo.checkout("feat").unwrap();
        write(&mut repo, "x.txt", "x\n");
        write(&mut repo, "y.txt", "y\n");
        repo.add("x.txt").unwrap();
        repo.add("y.txt").unwrap();
        repo.commit("add x and y").unwrap().unwrap();
        repo.checkout("master").unwrap();

        let id = repo
            .merge("feat", &[Resolution::new("x.txt", "")])
            .unwrap()
            .unwrap();

        let merge = repo.lookup_commit(id.as_str()).unwrap();
        assert!(merge.file("x.txt").is_none());
        assert!(merge.file("y.txt").is_some());
        assert!(repo.backend().get("x.txt").is_some());
    }

    #[test]
    fn test_empty_path_on_conflicting_file_keeps_union_bytes() {
        let mut repo = forked();

        repo.checkout("feat").unwrap();
        write(&mut repo, "a.txt", "theirs\n");
        repo.commit("theirs").unwrap().unwrap();

        repo.checkout("master").unwrap();
        write(&mut repo, "a.txt", "ours\n");
        repo.commit("ours").unwrap().unwrap();

        let id = repo
            .merge("feat", &[Resolution::new("a.txt", "")])
            .unwrap()
            .unwrap();

        let merge = repo.lookup_commit(id.as_str()).unwrap();
        assert!(merge.file("a.txt").is_none());
        assert!(merge.changes().contains(&Change::deletion("a.txt")));
        assert!(tracked(&repo).is_empty());
        assert_eq!(repo.backend().get("a.txt"), Some(&b"theirs\n"[..]));
    }

    #[test]
    fn test_replacement_resolution_wins() {
        let mut repo = forked();

        repo.checkout("feat").unwrap();
        write(&mut repo, "a.txt", "theirs\n");
        repo.commit("theirs").unwrap().unwrap();
        repo.checkout("master").unwrap();

        write(&mut repo, "resolved.txt", "resolved\n");
        let id = repo
            .merge("feat", &[Resolution::new("a.txt", "resolved.txt")])
            .unwrap()
            .unwrap();

        assert_eq!(repo.backend().get("a.txt"), Some(&b"resolved\n"[..]));
        let merge = repo.lookup_commit(id.as_str()).unwrap();
        let file = merge.file("a.txt").unwrap();
        assert_eq!(repo.store().get(file.blob).unwrap(), b"resolved\n");
        assert_eq!(file.fingerprint, crate::hash::fingerprint("a.txt", b"resolved\n"));
        assert!(merge.file("resolved.txt").is_none());
    }

    #[test]
    fn test_missing_resolution_file() {
        let mut repo = forked();
        repo.checkout("feat").unwrap();
        write(&mut repo, "a.txt", "theirs\n");
        repo.commit("theirs").unwrap().unwrap();
        repo.checkout("master").unwrap();

        let err = repo
            .merge("feat", &[Resolution::new("a.txt", "missing.txt")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_empty_resolution_name_rejected_before_mutation() {
        let mut repo = forked();
        repo.checkout("feat").unwrap();
        write(&mut repo, "f.txt", "f");
        repo.add("f.txt").unwrap();
        repo.commit("feature").unwrap().unwrap();
        repo.checkout("master").unwrap();

        let err = repo.merge("feat", &[Resolution::drop_file("")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(tracked(&repo), vec!["a.txt"]);
    }

    #[test]
    fn test_merge_without_changes() {
        let mut repo = forked();
        assert!(repo.merge("feat", &[]).unwrap().is_none());
        assert_eq!(repo.graph().len(), 1);
    }

    #[test]
    fn test_unborn_target_rejected() {
        let mut repo = repo();
        repo.create_branch("empty").unwrap();
        write(&mut repo, "a.txt", "a");
        repo.add("a.txt").unwrap();
        repo.commit("root").unwrap().unwrap();

        repo.checkout("empty").unwrap();
        let err = repo.merge("master", &[]).unwrap_err();
        assert!(matches!(err, Error::UnbornBranch(_)));
        assert!(repo.tracked_files().is_empty());
    }
}
