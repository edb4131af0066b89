//! C9 — mmap page-fault hook.
//!
//! `load_page_content` is invoked by the VM layer's page-fault handler to
//! populate one page of a private file mapping. `MAP_SHARED` file mappings
//! are not implemented; the VFS only ever installs `vm_ops` for
//! `MAP_PRIVATE`.

use crate::vfs::dentry::{Dentry, DentryCache};
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::fs_ops::FsMmapParams;
use crate::vmm::{self, AddressSpace, VMM_PAGE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    Private,
    Shared,
}

pub struct MmapRequest {
    pub size: u64,
    pub offset: u64,
    pub kind: MapKind,
}

/// A memory zone owned by the VM layer; the VFS only ever populates the
/// fields relevant to a file-backed private mapping.
pub struct MemoryZone {
    pub start: u64,
    pub len: u64,
    pub offset: u64,
    pub kind: MapKind,
    pub file: Option<Dentry>,
}

pub trait VmOps: Send + Sync {
    fn load_page_content(&self, zone: &MemoryZone, vaddr: u64) -> VfsResult<()>;
}

/// The VFS's own `vm_ops` implementation, installed on every private
/// file-backed zone created through `mmap`.
pub struct FileVmOps;

impl VmOps for FileVmOps {
    /// Invoked on the faulting thread's stack with the zone guaranteed
    /// live. Reads exactly one page from the file at the offset
    /// corresponding to the faulting address; a short read (file shorter
    /// than a page) leaves the tail of the page whatever the read left it,
    /// matching the "callers must zero-extend if required" contract.
    fn load_page_content(&self, zone: &MemoryZone, vaddr: u64) -> VfsResult<()> {
        let dentry = zone.file.as_ref().ok_or(VfsError::InvalidArgument)?;
        let file_offset = zone.offset + (vmm::page_start(vaddr) - zone.start);

        let mut page = [0u8; VMM_PAGE_SIZE as usize];
        let _ = dentry.ops().read(dentry.inode_indx(), file_offset, &mut page);

        vmm::copy_to_user(vmm::page_start(vaddr), &page);
        Ok(())
    }
}

/// `mmap(dentry, params)`: honour a filesystem override if it returns
/// anything other than the "use standard mmap" sentinel (`NotSupported`),
/// otherwise fall back to the VFS's own private-mapping path.
pub fn mmap(
    dentry: &Dentry,
    request: MmapRequest,
    space: &mut dyn AddressSpace,
) -> VfsResult<MemoryZone> {
    let fs_params = FsMmapParams {
        size: request.size,
        offset: request.offset,
        shared: request.kind == MapKind::Shared,
    };
    match dentry.ops().mmap(dentry.inode_indx(), &fs_params) {
        Ok(()) => {
            // The driver claimed full responsibility; the VFS has no zone
            // of its own to hand back.
            return Err(VfsError::NotSupported);
        }
        Err(VfsError::NotSupported) => {} // fall through to standard mmap
        Err(e) => return Err(e),
    }

    match request.kind {
        MapKind::Shared => Err(VfsError::NotSupported),
        MapKind::Private => {
            let start = space
                .alloc_random_zone(request.size)
                .map_err(|_| VfsError::NoSpace)?;
            Ok(MemoryZone {
                start,
                len: request.size,
                offset: request.offset,
                kind: MapKind::Private,
                file: Some(DentryCache::duplicate(dentry)),
            })
        }
    }
}

/// `munmap(zone)`: rejects zones that are not file-mapped, releases the
/// dentry reference, and flushes the TLB for each page of the zone.
pub fn munmap(zone: MemoryZone, space: &mut dyn AddressSpace) -> VfsResult<()> {
    let dentry = zone.file.ok_or(VfsError::InvalidArgument)?;

    let mut addr = zone.start;
    while addr < zone.start + zone.len {
        space.flush_local_tlb_entry(addr);
        addr += VMM_PAGE_SIZE;
    }

    drop(dentry); // releases exactly the one reference taken at mmap time
    Ok(())
}
