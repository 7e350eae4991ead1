use crate::error::{Error, Result};
use crate::models::TrackedFile;

/// The files a branch currently tracks, in the order they were first tracked.
///
/// Names are unique within one working set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSet {
    files: Vec<TrackedFile>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a working set from a commit snapshot. Blob handles are shared
    /// with the snapshot, names are copied.
    pub fn from_snapshot(snapshot: &[TrackedFile]) -> Self {
        Self {
            files: snapshot.to_vec(),
        }
    }

    pub fn files(&self) -> &[TrackedFile] {
        &self.files
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&TrackedFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TrackedFile> {
        self.files.iter_mut().find(|f| f.name == name)
    }

    /// Tracks a new file; fails if the name is already tracked.
    pub fn insert(&mut self, file: TrackedFile) -> Result<()> {
        if self.contains(&file.name) {
            return Err(Error::AlreadyTracked(file.name));
        }
        self.files.push(file);
        Ok(())
    }

    /// Replaces the entry with the same name, or appends it.
    pub fn upsert(&mut self, file: TrackedFile) {
        match self.position(&file.name) {
            Some(index) => self.files[index] = file,
            None => self.files.push(file),
        }
    }

    /// Untracks `name`, keeping the relative order of the remaining entries.
    pub fn remove(&mut self, name: &str) -> Option<TrackedFile> {
        self.position(name).map(|index| self.files.remove(index))
    }

    pub fn snapshot(&self) -> Vec<TrackedFile> {
        self.files.clone()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.name == name)
    }
}
