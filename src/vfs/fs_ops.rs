//! C2 — filesystem driver registry.
//!
//! A filesystem driver is a vtable of operations over inode numbers within
//! one mounted device. `recognize`, `read_inode`, `write_inode` and
//! `free_inode` are required; everything else carries a VFS-default
//! implementation so the dentry layer never has to special-case a missing
//! capability.
//!
//! `get_fsdata` from the originating driver ABI is intentionally not
//! reproduced here: `Arc<dyn FsOps>` already is the per-device opaque
//! filesystem-private handle (see DESIGN.md Open Questions).

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::RwLock;

use crate::vfs::device::Device;
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::inode::Inode;
use crate::vfs::types::{DirEntry, OpenFlags, Stat};

pub const MAX_DRIVERS: usize = 8;

/// Parameters for a filesystem-specific `mmap` override. A driver that
/// returns `Err(VfsError::NotSupported)` signals "use the VFS default path"
/// rather than "mmap is refused".
pub struct FsMmapParams {
    pub size: u64,
    pub offset: u64,
    pub shared: bool,
}

pub trait FsOps: Send + Sync {
    // --- required ---
    fn recognize(&self, device: &Device) -> VfsResult<()>;
    fn read_inode(&self, inode_indx: u64) -> VfsResult<Arc<Inode>>;
    fn write_inode(&self, inode_indx: u64, inode: &Inode) -> VfsResult<()>;
    fn free_inode(&self, inode_indx: u64) -> VfsResult<()>;

    // --- optional, per-dentry ---
    fn prepare_fs(&self, _device: &Device) -> VfsResult<()> {
        Ok(())
    }

    fn eject_device(&self) -> VfsResult<()> {
        Ok(())
    }

    fn lookup(&self, _parent_ino: u64, _name: &str) -> VfsResult<u64> {
        Err(VfsError::NotSupported)
    }

    fn open(&self, _inode_indx: u64, _flags: OpenFlags) -> VfsResult<()> {
        Err(VfsError::NotSupported)
    }

    fn read(&self, _inode_indx: u64, _offset: u64, _buf: &mut [u8]) -> VfsResult<usize> {
        Ok(0)
    }

    fn write(&self, _inode_indx: u64, _offset: u64, _buf: &[u8]) -> VfsResult<usize> {
        Ok(0)
    }

    fn can_read(&self, _inode_indx: u64) -> bool {
        true
    }

    fn can_write(&self, _inode_indx: u64) -> bool {
        true
    }

    fn truncate(&self, _inode_indx: u64, _size: u64) -> VfsResult<()> {
        Err(VfsError::NotSupported)
    }

    fn create(&self, _parent_ino: u64, _name: &str, _mode: u32) -> VfsResult<u64> {
        Err(VfsError::NotSupported)
    }

    fn unlink(&self, _parent_ino: u64, _name: &str) -> VfsResult<()> {
        Err(VfsError::NotSupported)
    }

    fn mkdir(&self, _parent_ino: u64, _name: &str, _mode: u32) -> VfsResult<u64> {
        Err(VfsError::NotSupported)
    }

    fn rmdir(&self, _parent_ino: u64, _name: &str) -> VfsResult<()> {
        Err(VfsError::NotSupported)
    }

    fn getdents(&self, _inode_indx: u64) -> VfsResult<Vec<DirEntry>> {
        Ok(Vec::new())
    }

    fn fstat(&self, _inode_indx: u64) -> VfsResult<Stat> {
        Err(VfsError::NotSupported)
    }

    fn ioctl(&self, _inode_indx: u64, _cmd: u32, _arg: usize) -> VfsResult<usize> {
        Err(VfsError::NotSupported)
    }

    /// Returning `Err(NotSupported)` means "fall through to the VFS's
    /// standard private-mapping path" (the original sentinel value).
    fn mmap(&self, _inode_indx: u64, _params: &FsMmapParams) -> VfsResult<()> {
        Err(VfsError::NotSupported)
    }
}

struct FsDriver {
    name: String,
    ops: Arc<dyn FsOps>,
}

pub struct FsRegistry {
    drivers: RwLock<Vec<FsDriver>>,
}

impl FsRegistry {
    pub const fn new() -> Self {
        Self {
            drivers: RwLock::new(Vec::new()),
        }
    }

    pub fn add_driver(&self, name: &str, ops: Arc<dyn FsOps>) -> VfsResult<usize> {
        let mut drivers = self.drivers.write();
        if drivers.len() >= MAX_DRIVERS {
            return Err(VfsError::NoSpace);
        }
        drivers.push(FsDriver {
            name: String::from(name),
            ops,
        });
        Ok(drivers.len() - 1)
    }

    /// First driver in insertion order whose `recognize` accepts the device.
    pub fn choose_fs_for_device(&self, device: &Device) -> VfsResult<usize> {
        self.drivers
            .read()
            .iter()
            .position(|d| d.ops.recognize(device).is_ok())
            .ok_or(VfsError::NotFound)
    }

    pub fn get(&self, index: usize) -> VfsResult<Arc<dyn FsOps>> {
        self.drivers
            .read()
            .get(index)
            .map(|d| d.ops.clone())
            .ok_or(VfsError::NotFound)
    }

    pub fn index_by_name(&self, name: &str) -> VfsResult<usize> {
        self.drivers
            .read()
            .iter()
            .position(|d| d.name == name)
            .ok_or(VfsError::NotFound)
    }
}
