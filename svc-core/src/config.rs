use crate::branch::BranchName;
use crate::error::Result;

pub const DEFAULT_BRANCH: &str = "master";

/// Settings fixed when a repository is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub default_branch: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            default_branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

impl RepositoryConfig {
    pub fn with_default_branch(mut self, name: impl Into<String>) -> Self {
        self.default_branch = name.into();
        self
    }

    pub(crate) fn default_branch_name(&self) -> Result<BranchName> {
        BranchName::try_parse(&self.default_branch)
    }
}
