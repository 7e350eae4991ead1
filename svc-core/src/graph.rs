//! Arena-backed commit graph.
//!
//! Commits live in a single growable arena and refer to each other through
//! [`CommitHandle`]s, so growth never invalidates a handle held by a branch.
//! Child edges form a tree rooted at the first commit: every commit is owned by
//! its first parent. A merge commit records its second parent without being
//! listed among that parent's children.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Commit, CommitHandle, CommitId};

#[derive(Debug, Default)]
pub struct CommitGraph {
    nodes: Vec<Option<Commit>>,
    root: Option<CommitHandle>,
}

impl CommitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<CommitHandle> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn get(&self, handle: CommitHandle) -> Result<&Commit> {
        self.nodes
            .get(handle.0)
            .and_then(Option::as_ref)
            .ok_or(Error::DanglingCommit(handle))
    }

    fn get_mut(&mut self, handle: CommitHandle) -> Result<&mut Commit> {
        self.nodes
            .get_mut(handle.0)
            .and_then(Option::as_mut)
            .ok_or(Error::DanglingCommit(handle))
    }

    /// Appends `commit` as the newest child of `parent`, or as the root when
    /// `parent` is `None`. The graph holds one root; callers must not insert a
    /// second parentless commit.
    pub(crate) fn insert(
        &mut self,
        mut commit: Commit,
        parent: Option<CommitHandle>,
    ) -> Result<CommitHandle> {
        let handle = CommitHandle(self.nodes.len());

        match parent {
            Some(parent) => {
                self.get_mut(parent)?.children.push(handle);
                commit.parents = vec![parent];
            }
            None => {
                debug_assert!(self.root.is_none(), "commit graph already has a root");
                commit.parents.clear();
                self.root = Some(handle);
            }
        }

        self.nodes.push(Some(commit));
        Ok(handle)
    }

    /// Turns a single-parent commit into a merge node.
    pub(crate) fn attach_second_parent(
        &mut self,
        handle: CommitHandle,
        second: CommitHandle,
    ) -> Result<()> {
        self.get(second)?;
        let commit = self.get_mut(handle)?;
        if commit.parents.len() != 1 {
            return Err(Error::InvalidArgument(format!(
                "{handle} has {} parent(s), a merge needs exactly one first",
                commit.parents.len()
            )));
        }
        commit.parents.push(second);
        Ok(())
    }

    /// Breadth-first search from the root along child edges; the first commit
    /// whose id matches exactly wins.
    pub fn lookup(&self, id: &str) -> Option<CommitHandle> {
        let mut queue = VecDeque::new();
        queue.extend(self.root);

        while let Some(handle) = queue.pop_front() {
            let commit = self.get(handle).ok()?;
            if commit.id == id {
                return Some(handle);
            }
            queue.extend(commit.children.iter().copied());
        }

        None
    }

    pub fn parent_ids(&self, handle: CommitHandle) -> Result<Vec<&CommitId>> {
        self.get(handle)?
            .parents
            .iter()
            .map(|p| self.get(*p).map(|c| &c.id))
            .collect()
    }

    /// Walks first parents from `from` back to the root, newest first.
    pub fn first_parent_history(&self, from: CommitHandle) -> Result<Vec<CommitHandle>> {
        let mut history = Vec::new();
        let mut cursor = Some(from);

        while let Some(handle) = cursor {
            history.push(handle);
            cursor = self.get(handle)?.parents.first().copied();
        }

        Ok(history)
    }

    /// Every reachable commit with all children listed before their parent.
    pub fn post_order(&self) -> Vec<CommitHandle> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return order;
        };

        // (node, index of the next child to descend into)
        let mut stack = vec![(root, 0usize)];
        while let Some((handle, next_child)) = stack.pop() {
            let children = match self.get(handle) {
                Ok(commit) => &commit.children,
                Err(_) => continue,
            };

            if let Some(child) = children.get(next_child) {
                stack.push((handle, next_child + 1));
                stack.push((*child, 0));
            } else {
                order.push(handle);
            }
        }

        order
    }

    /// Releases every commit exactly once, children before parents, and
    /// returns how many were released. The graph is empty afterwards.
    pub(crate) fn teardown(&mut self) -> usize {
        let mut released = 0;

        for handle in self.post_order() {
            if let Some(commit) = self.nodes[handle.0].take() {
                debug!(
                    id = %commit.id,
                    children = commit.children.len(),
                    "releasing commit"
                );
                released += 1;
            }
        }

        debug_assert_eq!(released, self.nodes.len(), "unreachable commits in graph");
        self.nodes.clear();
        self.root = None;
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BranchId;

    fn commit(id: &str) -> Commit {
        Commit::new(
            CommitId(id.to_string()),
            format!("message {id}"),
            Vec::new(),
            Vec::new(),
            BranchId(0),
        )
    }

    /// root -> a -> b, root -> c
    fn sample() -> (CommitGraph, [CommitHandle; 4]) {
        let mut graph = CommitGraph::new();
        let root = graph.insert(commit("root"), None).unwrap();
        let a = graph.insert(commit("a"), Some(root)).unwrap();
        let b = graph.insert(commit("b"), Some(a)).unwrap();
        let c = graph.insert(commit("c"), Some(root)).unwrap();
        (graph, [root, a, b, c])
    }

    #[test]
    fn test_insert_links_parent_and_child() {
        let (graph, [root, a, b, c]) = sample();

        assert_eq!(graph.root(), Some(root));
        assert!(graph.get(root).unwrap().is_root());
        assert_eq!(graph.get(root).unwrap().child_handles(), &[a, c]);
        assert_eq!(graph.get(b).unwrap().parent_handles(), &[a]);
        assert_eq!(graph.len(), 4);
    }

    #[test]
    fn test_insert_under_unknown_parent() {
        let mut graph = CommitGraph::new();
        let err = graph
            .insert(commit("x"), Some(CommitHandle(9)))
            .unwrap_err();

        assert!(matches!(err, Error::DanglingCommit(CommitHandle(9))));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_lookup_breadth_first() {
        let (graph, [_, a, _, c]) = sample();

        assert_eq!(graph.lookup("a"), Some(a));
        assert_eq!(graph.lookup("c"), Some(c));
        assert_eq!(graph.lookup("missing"), None);
        assert_eq!(CommitGraph::new().lookup("a"), None);
    }

    #[test]
    fn test_lookup_prefers_shallower_duplicate() {
        let mut graph = CommitGraph::new();
        let root = graph.insert(commit("root"), None).unwrap();
        let deep_parent = graph.insert(commit("p"), Some(root)).unwrap();
        graph.insert(commit("dup"), Some(deep_parent)).unwrap();
        let shallow = graph.insert(commit("dup"), Some(root)).unwrap();

        assert_eq!(graph.lookup("dup"), Some(shallow));
    }

    #[test]
    fn test_parent_ids_for_merge() {
        let (mut graph, [root, a, b, c]) = sample();
        let merge = graph.insert(commit("m"), Some(c)).unwrap();
        graph.attach_second_parent(merge, b).unwrap();

        let parents: Vec<_> = graph
            .parent_ids(merge)
            .unwrap()
            .into_iter()
            .map(|id| id.as_str().to_string())
            .collect();
        assert_eq!(parents, vec!["c", "b"]);
        assert!(graph.get(merge).unwrap().is_merge());
        assert!(graph.parent_ids(root).unwrap().is_empty());
        assert_eq!(graph.parent_ids(a).unwrap().len(), 1);

        // The second parent does not adopt the merge node.
        assert!(graph.get(b).unwrap().child_handles().is_empty());
    }

    #[test]
    fn test_second_parent_only_once() {
        let (mut graph, [root, a, b, _]) = sample();

        graph.attach_second_parent(b, root).unwrap();
        assert!(graph.attach_second_parent(b, a).is_err());
        assert!(graph.attach_second_parent(root, a).is_err());
    }

    #[test]
    fn test_first_parent_history() {
        let (graph, [root, a, b, _]) = sample();

        assert_eq!(graph.first_parent_history(b).unwrap(), vec![b, a, root]);
        assert_eq!(graph.first_parent_history(root).unwrap(), vec![root]);
    }

    #[test]
    fn test_post_order_children_first() {
        let (graph, [root, a, b, c]) = sample();

        assert_eq!(graph.post_order(), vec![b, a, c, root]);
    }

    #[test]
    fn test_post_order_deep_chain() {
        let mut graph = CommitGraph::new();
        let mut parent = graph.insert(commit("0"), None).unwrap();
        for i in 1..5_000 {
            parent = graph.insert(commit(&i.to_string()), Some(parent)).unwrap();
        }

        let order = graph.post_order();
        assert_eq!(order.len(), 5_000);
        assert_eq!(order.first(), Some(&parent));
        assert_eq!(order.last(), graph.root().as_ref());
    }

    #[test]
    fn test_teardown_releases_each_commit_once() {
        let (mut graph, [_, _, b, c]) = sample();
        let merge = graph.insert(commit("m"), Some(c)).unwrap();
        graph.attach_second_parent(merge, b).unwrap();

        assert_eq!(graph.teardown(), 5);
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
        assert_eq!(graph.teardown(), 0);
    }

    #[test]
    fn test_teardown_empty_graph() {
        let mut graph = CommitGraph::new();
        assert_eq!(graph.teardown(), 0);
    }
}
