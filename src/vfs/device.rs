//! C1 — device table, and C10 — device/driver event intake.
//!
//! A fixed-capacity table mapping a small device id to the filesystem index
//! bound to it. The first storage device ever bound becomes the root
//! device, and its inode `2` is the root dentry by the VFS/filesystem-driver
//! contract. Ejection does not reclaim the slot: see DESIGN.md for the
//! deliberate carry-over of that limitation.

use alloc::vec::Vec;
use spin::RwLock;

use crate::vfs::dentry::DentryCache;
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::fs_ops::FsRegistry;

pub const MAX_DEVICES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Storage,
    Other,
}

#[derive(Debug, Clone, Copy)]
pub struct Device {
    pub dev_id: u32,
    pub kind: DeviceKind,
    pub is_virtual: bool,
}

struct DeviceSlot {
    device: Device,
    fs_index: usize,
}

pub struct DeviceTable {
    slots: RwLock<Vec<Option<DeviceSlot>>>,
    root_dev_id: RwLock<Option<u32>>,
}

impl DeviceTable {
    pub const fn new() -> Self {
        Self {
            slots: RwLock::new(Vec::new()),
            root_dev_id: RwLock::new(None),
        }
    }

    /// Scan the registry in insertion order, binding to the first driver
    /// whose `recognize` accepts this device.
    pub fn add_device(&self, device: Device, registry: &FsRegistry) -> VfsResult<u32> {
        if device.kind != DeviceKind::Storage {
            return Err(VfsError::NotSupported);
        }
        let fs_index = registry.choose_fs_for_device(&device)?;
        self.add_device_with_fs(device, fs_index, Some(registry))
    }

    /// Bind a device to an explicit filesystem index, bypassing recognition
    /// (used by `mount`).
    pub fn add_device_with_fs(
        &self,
        device: Device,
        fs_index: usize,
        registry: Option<&FsRegistry>,
    ) -> VfsResult<u32> {
        if let Some(registry) = registry {
            let ops = registry.get(fs_index)?;
            ops.prepare_fs(&device)?;
        }

        let mut slots = self.slots.write();
        if slots.len() >= MAX_DEVICES {
            return Err(VfsError::NoSpace);
        }
        slots.push(Some(DeviceSlot { device, fs_index }));

        let mut root = self.root_dev_id.write();
        if root.is_none() {
            *root = Some(device.dev_id);
        }

        Ok(device.dev_id)
    }

    pub fn fs_index_for(&self, dev_id: u32) -> VfsResult<usize> {
        self.slots
            .read()
            .iter()
            .flatten()
            .find(|slot| slot.device.dev_id == dev_id)
            .map(|slot| slot.fs_index)
            .ok_or(VfsError::NotFound)
    }

    pub fn root_device_id(&self) -> VfsResult<u32> {
        self.root_dev_id.read().ok_or(VfsError::NotFound)
    }

    /// Eject a device: run the driver's `eject_device` hook if present, then
    /// force-evict every cached dentry of that device. The slot itself is
    /// intentionally not reclaimed (see Open Questions in DESIGN.md).
    pub fn eject_device(
        &self,
        dev_id: u32,
        registry: &FsRegistry,
        cache: &DentryCache,
    ) -> VfsResult<()> {
        let fs_index = self.fs_index_for(dev_id)?;
        let ops = registry.get(fs_index)?;
        ops.eject_device()?;
        cache.put_all_dentries_of_dev(dev_id);
        Ok(())
    }
}
