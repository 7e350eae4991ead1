//! Fingerprints for files and ids for commits.
//!
//! Both are SHA-256 digests truncated to their first eight bytes.

use sha2::{Digest, Sha256};

use crate::models::{Change, ChangeKind, CommitId, Fingerprint};

/// Fingerprint of `content` as stored under `path`.
pub fn fingerprint(path: &str, content: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    hasher.update([0u8]);
    hasher.update(content);
    Fingerprint(leading_u64(&hasher.finalize()))
}

/// Commit id derived from the message and the ordered change records alone.
pub fn commit_id(message: &str, changes: &[Change]) -> CommitId {
    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    hasher.update([0u8]);

    for change in changes {
        match change.kind {
            ChangeKind::Addition => hasher.update([b'+']),
            ChangeKind::Deletion => hasher.update([b'-']),
            ChangeKind::Modification { before, after } => {
                hasher.update([b'/']);
                hasher.update(before.0.to_be_bytes());
                hasher.update(after.0.to_be_bytes());
            }
        }
        hasher.update(change.file_name.as_bytes());
        hasher.update([0u8]);
    }

    let digest = hasher.finalize();
    CommitId(hex::encode(&digest[..8]))
}

fn leading_u64(digest: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}
