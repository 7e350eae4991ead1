use std::path::Path;

use tracing::{debug, info};

use crate::backend::{DiskBackend, FileBackend};
use crate::branch::{BranchName, BranchTable};
use crate::config::RepositoryConfig;
use crate::detect::ChangeDetector;
use crate::diff::FileDiff;
use crate::error::{Error, Result};
use crate::graph::CommitGraph;
use crate::hash;
use crate::models::{Change, Commit, CommitHandle, CommitId, Fingerprint, TrackedFile};
use crate::store::ContentStore;
use crate::working_set::WorkingSet;

/// Everything a version-control session owns: the commit graph, the branch
/// table with one working set per branch, the blob store and the file
/// backend the working tree lives in.
pub struct Repository<B: FileBackend = DiskBackend> {
    graph: CommitGraph,
    branches: BranchTable,
    store: ContentStore,
    backend: B,
    config: RepositoryConfig,
}

/// What [`Repository::teardown`] released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownReport {
    pub commits: usize,
    pub blobs: usize,
    pub branches: usize,
}

impl<B: FileBackend> Repository<B> {
    /// A fresh repository on the default branch with no commits.
    pub fn init(backend: B) -> Self {
        Self::from_parts(backend, RepositoryConfig::default(), BranchName::default())
    }

    pub fn with_config(backend: B, config: RepositoryConfig) -> Result<Self> {
        let default_branch = config.default_branch_name()?;
        Ok(Self::from_parts(backend, config, default_branch))
    }

    fn from_parts(backend: B, config: RepositoryConfig, default_branch: BranchName) -> Self {
        info!(branch = %default_branch, "initialized repository");
        Self {
            graph: CommitGraph::new(),
            branches: BranchTable::new(default_branch),
            store: ContentStore::new(),
            backend,
            config,
        }
    }

    /// Releases every commit (children before parents), every blob and every
    /// branch.
    pub fn teardown(mut self) -> TeardownReport {
        let report = TeardownReport {
            commits: self.graph.teardown(),
            blobs: self.store.release(),
            branches: self.branches.len(),
        };
        info!(
            commits = report.commits,
            blobs = report.blobs,
            branches = report.branches,
            "tore down repository"
        );
        report
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn graph(&self) -> &CommitGraph {
        &self.graph
    }

    pub fn branches(&self) -> &BranchTable {
        &self.branches
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    // File tracking

    /// Fingerprint of the file at `path` as it is on disk right now.
    pub fn fingerprint_file(&self, path: &str) -> Result<Fingerprint> {
        require_non_empty(path, "path")?;
        let bytes = self.read_file(Path::new(path))?;
        Ok(hash::fingerprint(path, &bytes))
    }

    /// Starts tracking `path` on the active branch and stores its content.
    pub fn add(&mut self, path: &str) -> Result<Fingerprint> {
        require_non_empty(path, "path")?;
        if self.branches.active().working_set().contains(path) {
            return Err(Error::AlreadyTracked(path.to_string()));
        }

        let bytes = self.read_file(Path::new(path))?;
        let fingerprint = hash::fingerprint(path, &bytes);
        let len = bytes.len();
        let blob = self.store.append(bytes);

        self.branches.active_mut().working_set.insert(TrackedFile {
            name: path.to_string(),
            fingerprint,
            blob,
            len,
        })?;

        debug!(file = path, %fingerprint, %blob, "tracking file");
        Ok(fingerprint)
    }

    /// Stops tracking `path`; the file on disk is left alone.
    pub fn remove(&mut self, path: &str) -> Result<Fingerprint> {
        require_non_empty(path, "path")?;
        let removed = self
            .branches
            .active_mut()
            .working_set
            .remove(path)
            .ok_or_else(|| Error::FileNotTracked(path.to_string()))?;

        debug!(file = path, fingerprint = %removed.fingerprint, "untracked file");
        Ok(removed.fingerprint)
    }

    pub fn tracked_files(&self) -> &[TrackedFile] {
        self.branches.active().working_set().files()
    }

    // Change detection

    /// Changes a commit would record right now, without recording anything.
    pub fn status(&self) -> Result<Vec<Change>> {
        Ok(self.detector()?.scan()?.into_changes())
    }

    pub fn is_dirty(&self) -> Result<bool> {
        self.detector()?.is_dirty()
    }

    fn detector(&self) -> Result<ChangeDetector<'_, B>> {
        Ok(ChangeDetector::new(
            self.branches.active().working_set(),
            self.head_snapshot()?,
            &self.backend,
        ))
    }

    fn head_snapshot(&self) -> Result<&[TrackedFile]> {
        match self.branches.active().head() {
            Some(head) => Ok(self.graph.get(head)?.files()),
            None => Ok(&[]),
        }
    }

    pub(crate) fn ensure_clean(&self) -> Result<()> {
        if self.is_dirty()? {
            return Err(Error::UncommittedChanges(self.active_branch().to_string()));
        }
        Ok(())
    }

    /// A commit on a branch without a head would be a second root.
    pub(crate) fn ensure_not_unborn(&self) -> Result<()> {
        if self.branches.active().head().is_none() && self.graph.root().is_some() {
            return Err(Error::UnbornBranch(self.active_branch().to_string()));
        }
        Ok(())
    }

    // Commits

    /// Records the active branch's changes. Returns `None` when there is
    /// nothing to commit.
    pub fn commit(&mut self, message: &str) -> Result<Option<CommitId>> {
        let Some(handle) = self.commit_handle(message)? else {
            return Ok(None);
        };
        Ok(Some(self.graph.get(handle)?.id().clone()))
    }

    pub(crate) fn commit_handle(&mut self, message: &str) -> Result<Option<CommitHandle>> {
        require_non_empty(message, "commit message")?;

        let scan = self.detector()?.scan()?;
        if !scan.is_clean() {
            self.ensure_not_unborn()?;
        }

        let changes = scan.apply(&mut self.branches.active_mut().working_set, &mut self.store);
        if changes.is_empty() {
            info!(branch = %self.active_branch(), "nothing to commit");
            return Ok(None);
        }

        let branch_id = self.branches.active_id();
        let parent = self.branches.active().head();
        let snapshot = self.branches.active().working_set().snapshot();
        let id = hash::commit_id(message, &changes);
        let change_count = changes.len();

        let commit = Commit::new(id.clone(), message.to_string(), snapshot, changes, branch_id);
        let handle = self.graph.insert(commit, parent)?;
        self.branches.active_mut().head = Some(handle);

        info!(
            %id,
            branch = %self.active_branch(),
            changes = change_count,
            "created commit"
        );
        Ok(Some(handle))
    }

    /// Breadth-first search for the commit with exactly this id.
    pub fn lookup_commit(&self, id: &str) -> Result<&Commit> {
        let handle = self.resolve(id)?;
        self.graph.get(handle)
    }

    fn resolve(&self, id: &str) -> Result<CommitHandle> {
        require_non_empty(id, "commit id")?;
        self.graph
            .lookup(id)
            .ok_or_else(|| Error::CommitNotFound(id.to_string()))
    }

    /// Ids of the commit's parents: none for the root, two for a merge.
    pub fn parents(&self, commit: &Commit) -> Result<Vec<&CommitId>> {
        commit
            .parent_handles()
            .iter()
            .map(|p| self.graph.get(*p).map(Commit::id))
            .collect()
    }

    /// The active branch's head commit.
    pub fn head(&self) -> Result<Option<&Commit>> {
        self.branches
            .active()
            .head()
            .map(|h| self.graph.get(h))
            .transpose()
    }

    /// First-parent history of the active branch, newest first.
    pub fn history(&self) -> Result<Vec<&Commit>> {
        let Some(head) = self.branches.active().head() else {
            return Ok(Vec::new());
        };
        self.graph
            .first_parent_history(head)?
            .into_iter()
            .map(|h| self.graph.get(h))
            .collect()
    }

    /// Line diffs of every change in commit `id` against its first parent.
    pub fn diff_commit(&self, id: &str) -> Result<Vec<FileDiff>> {
        let commit = self.lookup_commit(id)?;
        let parent = commit
            .parent_handles()
            .first()
            .map(|p| self.graph.get(*p))
            .transpose()?;

        commit
            .changes()
            .iter()
            .map(|change| -> Result<FileDiff> {
                let old = match parent.and_then(|p| p.file(&change.file_name)) {
                    Some(file) => Some(self.store.get(file.blob)?),
                    None => None,
                };
                let new = match commit.file(&change.file_name) {
                    Some(file) => Some(self.store.get(file.blob)?),
                    None => None,
                };
                Ok(FileDiff::from_change(change, old, new))
            })
            .collect()
    }

    // Branches

    pub fn list_branches(&self) -> Vec<&str> {
        self.branches.names()
    }

    pub fn active_branch(&self) -> &str {
        self.branches.active().name().as_str()
    }

    /// Forks the active branch. The new branch is not checked out.
    pub fn create_branch(&mut self, name: &str) -> Result<()> {
        let name = BranchName::try_parse(name)?;
        if self.branches.find(name.as_str()).is_some() {
            return Err(Error::BranchAlreadyExists(name.to_string()));
        }
        self.ensure_clean()?;

        let from = self.active_branch().to_string();
        self.branches.fork_active(name.clone())?;
        info!(branch = %name, from = %from, "created branch");
        Ok(())
    }

    /// Switches branches and rewrites the new head's files onto disk.
    pub fn checkout(&mut self, name: &str) -> Result<()> {
        let target = self
            .branches
            .find(name)
            .ok_or_else(|| Error::BranchNotFound(name.to_string()))?;
        self.ensure_clean()?;

        self.branches.set_active(target);
        if let Some(head) = self.branches.get(target).head() {
            self.restore_snapshot(head)?;
        }

        info!(branch = name, "checked out branch");
        Ok(())
    }

    /// Moves the active branch to commit `id`, restoring its files on disk and
    /// replacing the working set with its snapshot.
    pub fn reset(&mut self, id: &str) -> Result<()> {
        let handle = self.resolve(id)?;
        self.restore_snapshot(handle)?;

        let snapshot = self.graph.get(handle)?.files();
        let branch = self.branches.active_mut();
        branch.head = Some(handle);
        branch.working_set = WorkingSet::from_snapshot(snapshot);

        info!(%id, branch = %self.active_branch(), "reset branch");
        Ok(())
    }

    fn restore_snapshot(&mut self, handle: CommitHandle) -> Result<()> {
        let commit = self.graph.get(handle)?;
        for file in commit.files() {
            let bytes = self.store.get(file.blob)?;
            self.backend
                .write(Path::new(&file.name), bytes)
                .map_err(|e| Error::io(&file.name, e))?;
        }
        debug!(id = %commit.id(), files = commit.files().len(), "restored snapshot");
        Ok(())
    }

    pub(crate) fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.backend.read(path).map_err(|e| Error::io(path, e))
    }

    pub(crate) fn write_file(&mut self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.backend
            .write(path, bytes)
            .map_err(|e| Error::io(path, e))
    }

    pub(crate) fn store_mut(&mut self) -> &mut ContentStore {
        &mut self.store
    }

    pub(crate) fn branches_mut(&mut self) -> &mut BranchTable {
        &mut self.branches
    }

    pub(crate) fn graph_mut(&mut self) -> &mut CommitGraph {
        &mut self.graph
    }
}

pub(crate) fn require_non_empty(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} must not be empty")));
    }
    Ok(())
}
