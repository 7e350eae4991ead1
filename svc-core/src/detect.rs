//! Change detection between a branch head and the live working tree.
//!
//! Classification is split from its side effects: [`ChangeDetector::scan`]
//! only reads, and the returned [`Scan`] is applied to the working set and the
//! content store separately when a commit is actually being made.

use std::io;
use std::path::Path;

use tracing::{debug, warn};

use crate::backend::FileBackend;
use crate::error::{Error, Result};
use crate::hash::fingerprint;
use crate::models::{Change, Fingerprint, TrackedFile};
use crate::store::ContentStore;
use crate::working_set::WorkingSet;

pub struct ChangeDetector<'a, B: FileBackend + ?Sized> {
    working_set: &'a WorkingSet,
    head: &'a [TrackedFile],
    backend: &'a B,
}

/// Live content that must replace a working-set entry's blob.
#[derive(Debug)]
struct Refresh {
    name: String,
    fingerprint: Fingerprint,
    bytes: Vec<u8>,
}

/// Outcome of a scan: the change records plus the working-set edits they imply.
#[derive(Debug, Default)]
pub struct Scan {
    changes: Vec<Change>,
    untrack: Vec<String>,
    refresh: Vec<Refresh>,
}

impl Scan {
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    /// Untracks vanished files and stores refreshed content, then hands back
    /// the change records.
    pub(crate) fn apply(self, working_set: &mut WorkingSet, store: &mut ContentStore) -> Vec<Change> {
        for name in &self.untrack {
            working_set.remove(name);
        }

        for refresh in self.refresh {
            let len = refresh.bytes.len();
            let blob = store.append(refresh.bytes);
            if let Some(entry) = working_set.get_mut(&refresh.name) {
                entry.fingerprint = refresh.fingerprint;
                entry.blob = blob;
                entry.len = len;
            }
        }

        self.changes
    }
}

impl<'a, B: FileBackend + ?Sized> ChangeDetector<'a, B> {
    /// `head` is the head commit's snapshot, or empty when the branch has no
    /// commits yet.
    pub fn new(working_set: &'a WorkingSet, head: &'a [TrackedFile], backend: &'a B) -> Self {
        Self {
            working_set,
            head,
            backend,
        }
    }

    pub fn scan(&self) -> Result<Scan> {
        let mut scan = Scan::default();

        // Untracked since the head commit.
        for file in self.head {
            if !self.working_set.contains(&file.name) {
                scan.changes.push(Change::deletion(&file.name));
            }
        }

        // Deleted from disk behind our back, whether or not still tracked.
        for file in self.head {
            if !self.exists(&file.name) {
                scan.changes.push(Change::deletion(&file.name));
                if self.working_set.contains(&file.name) {
                    warn!(file = %file.name, "tracked file vanished, untracking");
                    scan.untrack.push(file.name.clone());
                }
            }
        }

        // Tracked since the head commit.
        for entry in self.working_set.iter() {
            if self.in_head(&entry.name).is_some() {
                continue;
            }

            match self.read_live(&entry.name)? {
                None => {
                    warn!(file = %entry.name, "added file vanished before commit, untracking");
                    scan.untrack.push(entry.name.clone());
                }
                Some(bytes) => {
                    scan.changes.push(Change::addition(&entry.name));
                    let live = fingerprint(&entry.name, &bytes);
                    if live != entry.fingerprint {
                        scan.refresh.push(Refresh {
                            name: entry.name.clone(),
                            fingerprint: live,
                            bytes,
                        });
                    }
                }
            }
        }

        // Content drift against the snapshot.
        for entry in self.working_set.iter() {
            let Some(snapshot) = self.in_head(&entry.name) else {
                continue;
            };
            // A missing file was already recorded as a deletion above.
            let Some(bytes) = self.read_live(&entry.name)? else {
                continue;
            };

            let live = fingerprint(&entry.name, &bytes);
            if live != snapshot.fingerprint {
                scan.changes.push(Change::modification(
                    &entry.name,
                    snapshot.fingerprint,
                    live,
                ));
            }
            if live != entry.fingerprint {
                scan.refresh.push(Refresh {
                    name: entry.name.clone(),
                    fingerprint: live,
                    bytes,
                });
            }
        }

        scan.changes
            .sort_by_key(|change| change.file_name.to_lowercase());

        debug!(
            changes = scan.changes.len(),
            untracked = scan.untrack.len(),
            refreshed = scan.refresh.len(),
            "scanned working set"
        );
        Ok(scan)
    }

    /// True as soon as any change would be recorded. Reads only.
    pub fn is_dirty(&self) -> Result<bool> {
        if self
            .head
            .iter()
            .any(|file| !self.working_set.contains(&file.name) || !self.exists(&file.name))
        {
            return Ok(true);
        }

        for entry in self.working_set.iter() {
            match self.in_head(&entry.name) {
                None => {
                    if self.read_live(&entry.name)?.is_some() {
                        return Ok(true);
                    }
                }
                Some(snapshot) => {
                    if let Some(bytes) = self.read_live(&entry.name)? {
                        if fingerprint(&entry.name, &bytes) != snapshot.fingerprint {
                            return Ok(true);
                        }
                    }
                }
            }
        }

        Ok(false)
    }

    fn in_head(&self, name: &str) -> Option<&'a TrackedFile> {
        self.head.iter().find(|f| f.name == name)
    }

    fn exists(&self, name: &str) -> bool {
        self.backend.exists(Path::new(name))
    }

    /// Live bytes, or `None` when `name` is not a file on disk.
    fn read_live(&self, name: &str) -> Result<Option<Vec<u8>>> {
        if !self.exists(name) {
            return Ok(None);
        }
        match self.backend.read(Path::new(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(name, e)),
        }
    }
}
