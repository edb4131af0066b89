//! C4 — file-descriptor objects.
//!
//! Each open file is represented by a `FileDescriptor` holding a dentry
//! reference, byte offset, open flags and a snapshot of the filesystem's
//! ops pointer, all under one lock (the spec groups `offset`, `ops` and
//! `dentry` assignment under a single per-fd lock). `dup`/`dup2` clone the
//! `Arc<FileDescriptor>` itself rather than the state, so duplicated fds
//! share one open-file description and its offset, matching POSIX `dup(2)`
//! rather than the simpler "independent copy" shortcut.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::Mutex;

use crate::vfs::dentry::{Dentry, DentryFlags};
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::fs_ops::FsOps;
use crate::vfs::types::{DirEntry, OpenFlags, SeekFrom, Stat};

pub const MAX_FILES: usize = 1024;
const FIRST_ALLOCATED_FD: i32 = 3;

struct FdState {
    dentry: Dentry,
    offset: u64,
    flags: OpenFlags,
    ops: Arc<dyn FsOps>,
}

pub struct FileDescriptor {
    state: Mutex<FdState>,
}

impl FileDescriptor {
    pub fn new(dentry: Dentry, flags: OpenFlags) -> Self {
        let ops = dentry.ops().clone();
        Self {
            state: Mutex::new(FdState {
                dentry,
                offset: 0,
                flags,
                ops,
            }),
        }
    }

    pub fn dentry(&self) -> Dentry {
        self.state.lock().dentry.clone()
    }

    pub fn flags(&self) -> OpenFlags {
        self.state.lock().flags
    }

    pub fn offset(&self) -> u64 {
        self.state.lock().offset
    }

    pub fn read(&self, buf: &mut [u8]) -> VfsResult<usize> {
        let mut state = self.state.lock();
        if !state.flags.is_readable() {
            return Err(VfsError::PermissionDenied);
        }
        let ino = state.dentry.inode_indx();
        let offset = state.offset;
        let n = state.ops.read(ino, offset, buf)?;
        state.offset += n as u64;
        Ok(n)
    }

    pub fn write(&self, buf: &[u8]) -> VfsResult<usize> {
        let mut state = self.state.lock();
        if !state.flags.is_writable() {
            return Err(VfsError::PermissionDenied);
        }

        let ino = state.dentry.inode_indx();
        if state.flags.has_flag(OpenFlags::TRUNC) {
            if state.ops.truncate(ino, state.offset).is_ok() {
                let _ = state.dentry.refresh_inode();
                state.dentry.set_flag(DentryFlags::DIRTY);
            }
        }
        if state.flags.has_flag(OpenFlags::APPEND) {
            if let Ok(stat) = state.dentry.stat() {
                state.offset = stat.size;
            }
        }

        let offset = state.offset;
        let n = state.ops.write(ino, offset, buf)?;
        state.offset += n as u64;
        if n > 0 {
            // The write grew/changed the file's content; fold the driver's
            // live size back into the cached inode and mark it for
            // write-back so `Drop` persists it on last close.
            let _ = state.dentry.refresh_inode();
            state.dentry.set_flag(DentryFlags::DIRTY);
        }
        Ok(n)
    }

    pub fn seek(&self, from: SeekFrom) -> VfsResult<u64> {
        let mut state = self.state.lock();
        let new_offset = match from {
            SeekFrom::Start(off) => off as i64,
            SeekFrom::Current(off) => state.offset as i64 + off,
            SeekFrom::End(off) => {
                let stat = state.dentry.stat()?;
                stat.size as i64 + off
            }
        };
        if new_offset < 0 {
            return Err(VfsError::InvalidSeek);
        }
        state.offset = new_offset as u64;
        Ok(state.offset)
    }

    pub fn stat(&self) -> VfsResult<Stat> {
        self.state.lock().dentry.stat()
    }

    /// fd-based, offset-tracked directory read: each call under this fd's
    /// own lock continues from where the previous call left off (counted in
    /// entries, there being no fixed on-wire entry size here) and returns an
    /// empty batch once the directory is exhausted, the same shape as the
    /// repeat-until-empty `getdents(2)` convention.
    pub fn getdents(&self) -> VfsResult<Vec<DirEntry>> {
        let mut state = self.state.lock();
        if !state.dentry.is_dir() {
            return Err(VfsError::NotDirectory);
        }
        let ino = state.dentry.inode_indx();
        let all = state.ops.getdents(ino)?;
        let start = state.offset as usize;
        if start >= all.len() {
            return Ok(Vec::new());
        }
        let batch = all[start..].to_vec();
        state.offset = all.len() as u64;
        Ok(batch)
    }

    pub fn sync(&self) -> VfsResult<()> {
        let state = self.state.lock();
        state.ops.write_inode(state.dentry.inode_indx(), state.dentry.inode())
    }
}

pub struct OpenFileTable {
    files: BTreeMap<i32, Arc<FileDescriptor>>,
    next_fd: i32,
}

impl OpenFileTable {
    pub const fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            next_fd: FIRST_ALLOCATED_FD,
        }
    }

    fn allocate_fd(&mut self) -> VfsResult<i32> {
        if self.files.len() >= MAX_FILES {
            return Err(VfsError::TooManyFiles);
        }
        let mut candidate = FIRST_ALLOCATED_FD;
        while self.files.contains_key(&candidate) {
            candidate += 1;
        }
        self.next_fd = candidate + 1;
        Ok(candidate)
    }

    pub fn insert(&mut self, fd: FileDescriptor) -> VfsResult<i32> {
        let slot = self.allocate_fd()?;
        self.files.insert(slot, Arc::new(fd));
        Ok(slot)
    }

    pub fn insert_at(&mut self, fd_num: i32, fd: FileDescriptor) -> VfsResult<()> {
        if fd_num < 0 {
            return Err(VfsError::InvalidArgument);
        }
        if self.files.len() >= MAX_FILES && !self.files.contains_key(&fd_num) {
            return Err(VfsError::TooManyFiles);
        }
        self.files.insert(fd_num, Arc::new(fd));
        Ok(())
    }

    pub fn get(&self, fd: i32) -> VfsResult<Arc<FileDescriptor>> {
        self.files.get(&fd).cloned().ok_or(VfsError::BadFileDescriptor)
    }

    pub fn remove(&mut self, fd: i32) -> VfsResult<()> {
        self.files.remove(&fd).map(|_| ()).ok_or(VfsError::BadFileDescriptor)
    }

    pub fn duplicate(&mut self, fd: i32) -> VfsResult<i32> {
        let existing = self.get(fd)?;
        let slot = self.allocate_fd()?;
        self.files.insert(slot, existing);
        Ok(slot)
    }

    pub fn duplicate_to(&mut self, oldfd: i32, newfd: i32) -> VfsResult<i32> {
        if oldfd == newfd {
            self.get(oldfd)?;
            return Ok(newfd);
        }
        let existing = self.get(oldfd)?;
        self.files.insert(newfd, existing);
        Ok(newfd)
    }
}
