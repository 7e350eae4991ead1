use std::fmt;

use serde::Serialize;

use crate::config::DEFAULT_BRANCH;
use crate::error::{Error, Result};
use crate::models::{BranchId, CommitHandle};
use crate::working_set::WorkingSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Accepts non-empty names made of ASCII letters, digits, `-`, `_` and `/`.
    pub fn try_parse(name: &str) -> Result<Self> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'));

        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(Error::InvalidBranchName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Branch {
    name: BranchName,
    pub(crate) head: Option<CommitHandle>,
    pub(crate) working_set: WorkingSet,
}

impl Branch {
    pub fn name(&self) -> &BranchName {
        &self.name
    }

    pub fn head(&self) -> Option<CommitHandle> {
        self.head
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }
}

/// Every branch in creation order, plus the active-branch selector.
#[derive(Debug)]
pub struct BranchTable {
    branches: Vec<Branch>,
    active: BranchId,
}

impl BranchTable {
    /// A table holding only `default_branch`, which starts out active.
    pub fn new(default_branch: BranchName) -> Self {
        Self {
            branches: vec![Branch {
                name: default_branch,
                head: None,
                working_set: WorkingSet::new(),
            }],
            active: BranchId(0),
        }
    }

    pub fn find(&self, name: &str) -> Option<BranchId> {
        self.branches
            .iter()
            .position(|b| b.name.as_str() == name)
            .map(BranchId)
    }

    pub fn get(&self, id: BranchId) -> &Branch {
        &self.branches[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: BranchId) -> &mut Branch {
        &mut self.branches[id.0]
    }

    pub fn active_id(&self) -> BranchId {
        self.active
    }

    pub fn active(&self) -> &Branch {
        self.get(self.active)
    }

    pub(crate) fn active_mut(&mut self) -> &mut Branch {
        let active = self.active;
        self.get_mut(active)
    }

    pub(crate) fn set_active(&mut self, id: BranchId) {
        self.active = id;
    }

    /// Forks the active branch: same head, copied working set.
    pub(crate) fn fork_active(&mut self, name: BranchName) -> Result<BranchId> {
        if self.find(name.as_str()).is_some() {
            return Err(Error::BranchAlreadyExists(name.0));
        }

        let source = self.active();
        let branch = Branch {
            name,
            head: source.head,
            working_set: source.working_set.clone(),
        };
        self.branches.push(branch);
        Ok(BranchId(self.branches.len() - 1))
    }

    pub fn names(&self) -> Vec<&str> {
        self.branches.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}
