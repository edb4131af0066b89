//! C3 — dentry cache.
//!
//! A dentry is keyed on `(dev_id, inode_indx)`. The cache stores only a
//! `Weak` reference per key; every live dentry handle elsewhere in the
//! kernel (path-resolution results, open fds, mount pins) holds a strong
//! `Arc`. When the last strong `Arc` drops, `Drop for DentryInner` runs the
//! deferred inode write-back/free exactly once, which is the Rust
//! translation of the original `dentry_get`/`duplicate`/`put` discipline
//! ("Manual refcounting -> scoped ownership").
//!
//! Lock order: cache lock, then a dentry's own state lock. Never reversed.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::{Arc, Weak};
use bitflags::bitflags;
use spin::{Mutex, RwLock};

use crate::vfs::error::VfsResult;
use crate::vfs::fs_ops::FsOps;
use crate::vfs::inode::Inode;
use crate::vfs::types::Stat;

bitflags! {
    pub struct DentryFlags: u32 {
        /// Never openable (reserved for internal/bookkeeping dentries).
        const PRIVATE = 1 << 0;
        /// A directory here has another filesystem laid on top.
        const MOUNTPOINT = 1 << 1;
        /// This dentry is the root of a filesystem mounted elsewhere.
        const MOUNTED = 1 << 2;
        /// Defer `free_inode` until the last reference drops.
        const INODE_TO_BE_DELETED = 1 << 3;
        /// Inode modified, pending write-back.
        const DIRTY = 1 << 4;
    }
}

struct DentryState {
    filename: String,
    parent: Option<Dentry>,
    flags: DentryFlags,
    /// Strong: mountpoint -> mounted root.
    mounted_dentry: Option<Dentry>,
    /// Weak: mounted root -> mountpoint, breaking the cross-link cycle.
    mountpoint: Option<Weak<DentryInner>>,
}

pub struct DentryInner {
    dev_id: u32,
    inode_indx: u64,
    ops: Arc<dyn FsOps>,
    inode: Arc<Inode>,
    state: Mutex<DentryState>,
}

pub type Dentry = Arc<DentryInner>;

impl Drop for DentryInner {
    fn drop(&mut self) {
        let (to_be_deleted, dirty) = {
            let state = self.state.lock();
            (
                state.flags.contains(DentryFlags::INODE_TO_BE_DELETED),
                state.flags.contains(DentryFlags::DIRTY),
            )
        };

        if to_be_deleted {
            let _ = self.ops.free_inode(self.inode_indx);
        } else if dirty {
            let _ = self.ops.write_inode(self.inode_indx, &self.inode);
        }

        dentry_cache().forget(self.dev_id, self.inode_indx);
    }
}

impl DentryInner {
    pub fn dev_id(&self) -> u32 {
        self.dev_id
    }

    pub fn inode_indx(&self) -> u64 {
        self.inode_indx
    }

    pub fn ops(&self) -> &Arc<dyn FsOps> {
        &self.ops
    }

    pub fn inode(&self) -> &Arc<Inode> {
        &self.inode
    }

    pub fn is_dir(&self) -> bool {
        self.inode.is_dir()
    }

    /// Current strong reference count, i.e. `d_count`.
    pub fn d_count(this: &Dentry) -> usize {
        Arc::strong_count(this)
    }

    pub fn filename(&self) -> String {
        self.state.lock().filename.clone()
    }

    pub fn parent(&self) -> Option<Dentry> {
        self.state.lock().parent.clone()
    }

    pub fn flags(&self) -> DentryFlags {
        self.state.lock().flags
    }

    pub fn set_flag(&self, flag: DentryFlags) {
        self.state.lock().flags.insert(flag);
    }

    pub fn clear_flag(&self, flag: DentryFlags) {
        self.state.lock().flags.remove(flag);
    }

    pub fn mounted_dentry(&self) -> Option<Dentry> {
        self.state.lock().mounted_dentry.clone()
    }

    pub fn mountpoint(&self) -> Option<Dentry> {
        self.state.lock().mountpoint.as_ref().and_then(Weak::upgrade)
    }

    /// Called on the mountpoint side: pins `mounted` (strong) and marks
    /// this dentry as a mountpoint.
    pub fn set_mount_link(&self, mounted: &Dentry) {
        let mut state = self.state.lock();
        state.mounted_dentry = Some(mounted.clone());
        state.flags.insert(DentryFlags::MOUNTPOINT);
    }

    /// Called on the mounted root side: keeps only a weak back-pointer to
    /// the mountpoint, breaking the reference cycle.
    pub fn set_mountpoint_back_link(&self, mountpoint: &Dentry) {
        let mut state = self.state.lock();
        state.mountpoint = Some(Arc::downgrade(mountpoint));
        state.flags.insert(DentryFlags::MOUNTED);
    }

    pub fn clear_mount_link(&self) {
        let mut state = self.state.lock();
        state.mounted_dentry = None;
        state.flags.remove(DentryFlags::MOUNTPOINT);
    }

    pub fn clear_mountpoint_back_link(&self) {
        let mut state = self.state.lock();
        state.mountpoint = None;
        state.flags.remove(DentryFlags::MOUNTED);
    }

    /// Rewrite `filename`/`parent` to reflect a fresh traversal. Callers are
    /// responsible for skipping this on the `.`/`..` dotdot-compensation
    /// case (see resolver).
    pub fn rebind(&self, parent: &Dentry, name: &str) {
        let mut state = self.state.lock();
        state.parent = Some(parent.clone());
        state.filename = String::from(name);
    }

    /// Re-reads inode metadata from the owning filesystem driver and folds
    /// it into the cached `Inode` (`refresh_from`). `get()` only calls
    /// `read_inode` once, at cache-miss time, so a dentry kept alive across
    /// writes (e.g. by an open fd) would otherwise report that creation-time
    /// snapshot forever; callers that just mutated a file's contents, or
    /// `stat()`'s fallback path below, call this to see the live state.
    pub fn refresh_inode(&self) -> VfsResult<()> {
        let fresh = self.ops.read_inode(self.inode_indx)?;
        self.inode.refresh_from(&fresh);
        Ok(())
    }

    pub fn stat(&self) -> VfsResult<Stat> {
        if let Ok(stat) = self.ops.fstat(self.inode_indx) {
            return Ok(stat);
        }
        let _ = self.refresh_inode();
        Ok(Stat {
            dev: self.dev_id as u64,
            ino: self.inode_indx,
            inode_type: self.inode.inode_type(),
            mode: self.inode.mode(),
            size: self.inode.size(),
            nlink: self.inode.links_count(),
            uid: self.inode.uid(),
            gid: self.inode.gid(),
        })
    }
}

pub struct DentryCache {
    table: Mutex<BTreeMap<(u32, u64), Weak<DentryInner>>>,
}

impl DentryCache {
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(BTreeMap::new()),
        }
    }

    /// Return a fresh strong reference, loading the inode via the
    /// filesystem's `read_inode` on a cache miss.
    pub fn get(&self, dev_id: u32, inode_indx: u64, ops: &Arc<dyn FsOps>) -> VfsResult<Dentry> {
        if let Some(dentry) = self.lookup_cached(dev_id, inode_indx) {
            return Ok(dentry);
        }

        let inode = ops.read_inode(inode_indx)?;
        let dentry = Arc::new(DentryInner {
            dev_id,
            inode_indx,
            ops: ops.clone(),
            inode,
            state: Mutex::new(DentryState {
                filename: String::new(),
                parent: None,
                flags: DentryFlags::empty(),
                mounted_dentry: None,
                mountpoint: None,
            }),
        });

        let mut table = self.table.lock();
        // Another thread may have raced us to populate this slot.
        if let Some(existing) = table.get(&(dev_id, inode_indx)).and_then(Weak::upgrade) {
            return Ok(existing);
        }
        table.insert((dev_id, inode_indx), Arc::downgrade(&dentry));
        Ok(dentry)
    }

    fn lookup_cached(&self, dev_id: u32, inode_indx: u64) -> Option<Dentry> {
        self.table
            .lock()
            .get(&(dev_id, inode_indx))
            .and_then(Weak::upgrade)
    }

    /// Increment the refcount (`duplicate`). A thin wrapper over `Arc::clone`
    /// kept for symmetry with `put`.
    pub fn duplicate(d: &Dentry) -> Dentry {
        d.clone()
    }

    /// Decrement the refcount (`put`). Dropping the handle runs
    /// `Drop for DentryInner` exactly when the last reference disappears.
    pub fn put(d: Dentry) {
        drop(d)
    }

    /// Purge cache entries whose weak reference has already expired.
    /// Called from `Drop for DentryInner` and at device ejection.
    fn forget(&self, dev_id: u32, inode_indx: u64) {
        let mut table = self.table.lock();
        if let Some(weak) = table.get(&(dev_id, inode_indx)) {
            if weak.upgrade().is_none() {
                table.remove(&(dev_id, inode_indx));
            }
        }
    }

    /// Force-evict every stale entry belonging to a device, used when the
    /// device is ejected. Entries still strongly held elsewhere survive
    /// until their own last reference drops; this call only reclaims the
    /// cache's bookkeeping for already-dead ones.
    pub fn put_all_dentries_of_dev(&self, dev_id: u32) {
        let mut table = self.table.lock();
        table.retain(|(dev, _), weak| *dev != dev_id || weak.upgrade().is_some());
    }
}

static DENTRY_CACHE_INSTANCE: DentryCache = DentryCache::new();

pub fn dentry_cache() -> &'static DentryCache {
    &DENTRY_CACHE_INSTANCE
}

/// Validate the dotdot-compensation case from the path resolver: a lookup
/// result must not have its parent/filename rewritten when it is simply `.`
/// (equal to the base it was looked up from) or `..` (the base's own
/// parent), matching `cur_dent != parent_dent && parent_dent->parent !=
/// cur_dent` from the original resolver.
pub fn is_dotdot_compensated(base: &Dentry, child: &Dentry) -> bool {
    if Arc::ptr_eq(base, child) {
        return true;
    }
    if let Some(base_parent) = base.parent() {
        if Arc::ptr_eq(&base_parent, child) {
            return true;
        }
    }
    false
}
