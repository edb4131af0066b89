//! C11 — absolute-path reconstruction.
//!
//! Walks a dentry's `parent` chain back to the root, the inverse of the
//! resolver's forward walk. Used by syscalls like `getcwd`/`readlink` that
//! need a path string back from a dentry rather than the other way round.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::vfs::dentry::Dentry;
use crate::vfs::error::{VfsError, VfsResult};

/// Hops allowed before giving up on ever reaching `root`. A dentry whose
/// chain exceeds this, or whose chain runs out (`parent() == None`) before
/// reaching `root`, is treated as a detached subtree (`EAGAIN`) — this is
/// reachable for a dentry that was `unlink`ed while still open elsewhere.
pub const MAX_PATH_DEPTH: usize = 64;

pub fn absolute_path(root: &Dentry, dentry: &Dentry, max_len: usize) -> VfsResult<String> {
    if Arc::ptr_eq(root, dentry) {
        return Ok(String::from("/"));
    }

    let mut components: Vec<String> = Vec::new();
    let mut current = dentry.clone();
    let mut depth = 0usize;

    loop {
        let parent = current.parent().ok_or(VfsError::Again)?;
        components.push(current.filename());

        if Arc::ptr_eq(&parent, root) {
            break;
        }

        current = parent;
        depth += 1;
        if depth > MAX_PATH_DEPTH {
            return Err(VfsError::Again);
        }
    }

    components.reverse();
    let mut path = String::new();
    for component in &components {
        path.push('/');
        path.push_str(component);
    }

    if path.len() > max_len {
        return Err(VfsError::Overflow);
    }

    Ok(path)
}
