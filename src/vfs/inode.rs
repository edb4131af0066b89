//! In-memory inode mirror.
//!
//! The VFS never manufactures inode content; it is a cache of whatever the
//! owning filesystem's `read_inode` produced, written back through
//! `write_inode` when `DIRTY`, freed through `free_inode` when the last
//! dentry reference drops with `INODE_TO_BE_DELETED` set.

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

pub const S_IFDIR: u32 = 0o040_000;
pub const S_IFSOCK: u32 = 0o140_000;
pub const S_IFREG: u32 = 0o100_000;
const S_IFMT: u32 = 0o170_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeType {
    File,
    Directory,
    Socket,
}

impl InodeType {
    pub fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            S_IFDIR => InodeType::Directory,
            S_IFSOCK => InodeType::Socket,
            _ => InodeType::File,
        }
    }
}

/// In-memory inode metadata, independent of any particular filesystem's
/// on-disk representation.
pub struct Inode {
    mode: AtomicU32,
    uid: AtomicU32,
    gid: AtomicU32,
    size: AtomicU64,
    links_count: AtomicU32,
}

impl Inode {
    pub fn new(mode: u32, uid: u32, gid: u32, size: u64, links_count: u32) -> Self {
        Self {
            mode: AtomicU32::new(mode),
            uid: AtomicU32::new(uid),
            gid: AtomicU32::new(gid),
            size: AtomicU64::new(size),
            links_count: AtomicU32::new(links_count),
        }
    }

    pub fn mode(&self) -> u32 {
        self.mode.load(Ordering::Acquire)
    }

    pub fn set_mode(&self, mode: u32) {
        self.mode.store(mode, Ordering::Release);
    }

    pub fn uid(&self) -> u32 {
        self.uid.load(Ordering::Acquire)
    }

    pub fn gid(&self) -> u32 {
        self.gid.load(Ordering::Acquire)
    }

    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Acquire)
    }

    pub fn set_size(&self, size: u64) {
        self.size.store(size, Ordering::Release);
    }

    pub fn links_count(&self) -> u32 {
        self.links_count.load(Ordering::Acquire)
    }

    /// Folds a freshly read inode's fields into this one in place, so every
    /// outstanding `Arc<Inode>` clone (a dentry shared across open fds)
    /// observes the refresh without the holder needing to swap the `Arc`.
    pub fn refresh_from(&self, other: &Inode) {
        self.mode.store(other.mode(), Ordering::Release);
        self.uid.store(other.uid(), Ordering::Release);
        self.gid.store(other.gid(), Ordering::Release);
        self.size.store(other.size(), Ordering::Release);
        self.links_count.store(other.links_count(), Ordering::Release);
    }

    pub fn inode_type(&self) -> InodeType {
        InodeType::from_mode(self.mode())
    }

    pub fn is_dir(&self) -> bool {
        self.inode_type() == InodeType::Directory
    }
}
