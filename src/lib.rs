//! # svc
//!
//! Minimal in-memory version control: track files, commit snapshots, fork
//! branches with their own working sets and merge them back together.
//!
//! ## Example
//!
//! ```
//! use svc::{MemoryBackend, Repository};
//!
//! let mut backend = MemoryBackend::new();
//! backend.insert("hello.txt", "hello");
//!
//! let mut repo = Repository::init(backend);
//! repo.add("hello.txt").unwrap();
//! let id = repo.commit("Say hello").unwrap().unwrap();
//!
//! assert_eq!(repo.lookup_commit(id.as_str()).unwrap().message(), "Say hello");
//! ```

pub use svc_core::*;
