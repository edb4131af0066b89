//! C6 — mount manager.
//!
//! Binds a new device+filesystem at a directory dentry and unbinds it,
//! preserving the cache invariants (notably that a mountpoint and its
//! mounted root are always pinned against eviction while attached).

use alloc::sync::Arc;
use alloc::vec::Vec;
use spin::RwLock;

use crate::vfs::dentry::{dentry_cache, Dentry, DentryFlags};
use crate::vfs::device::Device;
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::fs_ops::FsRegistry;
use crate::vfs::device::DeviceTable;

/// Root inode index contract shared by every filesystem driver.
pub const ROOT_INODE_INDX: u64 = 2;

struct MountEntry {
    /// Extra pin keeping the mountpoint dentry alive for the lifetime of
    /// the mount, beyond whatever strong references path resolution
    /// transiently holds.
    mountpoint: Dentry,
    /// Extra pin keeping the mounted root dentry alive likewise.
    root: Dentry,
}

pub struct MountTable {
    mounts: RwLock<Vec<MountEntry>>,
}

impl MountTable {
    pub const fn new() -> Self {
        Self {
            mounts: RwLock::new(Vec::new()),
        }
    }

    pub fn mount(
        &self,
        devices: &DeviceTable,
        registry: &FsRegistry,
        mountpoint: &Dentry,
        device: Device,
        fs_index: usize,
    ) -> VfsResult<()> {
        if mountpoint.flags().contains(DentryFlags::MOUNTPOINT) {
            return Err(VfsError::Busy);
        }
        if !mountpoint.is_dir() {
            return Err(VfsError::NotDirectory);
        }

        let dev_id = devices.add_device_with_fs(device, fs_index, Some(registry))?;
        let ops = registry.get(fs_index)?;
        let root = dentry_cache().get(dev_id, ROOT_INODE_INDX, &ops)?;

        mountpoint.set_mount_link(&root);
        root.set_mountpoint_back_link(mountpoint);

        self.mounts.write().push(MountEntry {
            mountpoint: mountpoint.clone(),
            root,
        });

        Ok(())
    }

    /// Unmount the filesystem whose root is `mounted_root`. Iterative by
    /// design: stacked mounts (a mountpoint that is itself a mounted root)
    /// are unwound one level per call rather than recursing after the lock
    /// is released, which the original flags as fragile (see DESIGN.md).
    pub fn umount(&self, mounted_root: &Dentry) -> VfsResult<()> {
        let mountpoint = mounted_root.mountpoint().ok_or(VfsError::InvalidArgument)?;
        if !mounted_root.flags().contains(DentryFlags::MOUNTED)
            || !mountpoint.flags().contains(DentryFlags::MOUNTPOINT)
        {
            return Err(VfsError::InvalidArgument);
        }

        mountpoint.clear_mount_link();
        mounted_root.clear_mountpoint_back_link();

        self.mounts
            .write()
            .retain(|m| !Arc::ptr_eq(&m.root, mounted_root));

        Ok(())
    }
}
