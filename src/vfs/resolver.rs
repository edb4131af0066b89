//! C5 — path resolver.
//!
//! Walks `/`-separated components, honouring `.`, `..`, and mount
//! traversal, and produces a stable strong dentry reference.

use crate::vfs::dentry::{dentry_cache, is_dotdot_compensated, Dentry, DentryFlags};
use crate::vfs::error::{VfsError, VfsResult};

/// `resolve(start, path)` per the design-level algorithm in the component
/// design: anchor at root (or `start`), then walk component by component,
/// following mount boundaries and rewriting parent/filename as it goes.
pub fn resolve_path(root: &Dentry, start: Option<&Dentry>, path: &str) -> VfsResult<Dentry> {
    if path.is_empty() {
        return Err(VfsError::Fault);
    }

    let mut current: Dentry = if start.is_none() || path.starts_with('/') {
        root.clone()
    } else {
        start.unwrap().clone()
    };

    let mut rest = path;
    loop {
        rest = rest.trim_start_matches('/');
        if rest.is_empty() {
            break;
        }

        let (name, remainder) = match rest.find('/') {
            Some(pos) => (&rest[..pos], &rest[pos + 1..]),
            None => (rest, ""),
        };
        rest = remainder;

        if name == "." {
            // Universal short-circuit, same as the original's vfs_lookup:
            // "." never touches the filesystem driver and never rebinds.
            if rest.is_empty() {
                break;
            }
            continue;
        }

        // A mounted root's ".." escapes through its mountpoint's parent
        // directly; this is a boundary jump, not an ordinary lookup, so it
        // never calls into the filesystem and never rebinds parent/filename
        // (the jumped-to dentry already has its own correct parent link).
        if name == ".." && current.flags().contains(DentryFlags::MOUNTED) {
            current = current
                .mountpoint()
                .and_then(|mp| mp.parent())
                .unwrap_or_else(|| current.clone());
            if rest.is_empty() {
                break;
            }
            continue;
        }

        if !current.is_dir() {
            return Err(VfsError::NotDirectory);
        }

        let ops = current.ops().clone();
        let child_ino = ops
            .lookup(current.inode_indx(), name)
            .map_err(|e| if e == VfsError::NotSupported { VfsError::NotFound } else { e })?;

        let mut child = dentry_cache().get(current.dev_id(), child_ino, &ops)?;

        // Follow any MOUNTPOINT chain transparently.
        while child.flags().contains(DentryFlags::MOUNTPOINT) {
            match child.mounted_dentry() {
                Some(mounted) => child = mounted,
                None => break,
            }
        }

        if !is_dotdot_compensated(&current, &child) {
            child.rebind(&current, name);
        }

        current = child;

        if rest.is_empty() {
            break;
        }
    }

    Ok(current)
}

/// Split a path into `(parent_dentry, leaf_name)`, resolving the parent
/// through the same resolver used for full paths.
pub fn resolve_parent(
    root: &Dentry,
    start: Option<&Dentry>,
    path: &str,
) -> VfsResult<(Dentry, alloc::string::String)> {
    use alloc::string::String;

    let path = path.trim_end_matches('/');
    if path.is_empty() {
        return Err(VfsError::InvalidArgument);
    }

    match path.rfind('/') {
        Some(pos) => {
            let parent_path = if pos == 0 { "/" } else { &path[..pos] };
            let filename = &path[pos + 1..];
            if filename.is_empty() {
                return Err(VfsError::InvalidArgument);
            }
            let parent = resolve_path(root, start, parent_path)?;
            Ok((parent, String::from(filename)))
        }
        None => {
            let parent = match start {
                Some(s) => s.clone(),
                None => root.clone(),
            };
            Ok((parent, String::from(path)))
        }
    }
}

// End-to-end path resolution tests (mount traversal, `.`/`..`, dotdot
// compensation) live in vfs::tests, where a wired-up VfsState and ramfs
// are available.
