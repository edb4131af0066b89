//! Minimal virtual-memory-manager collaborator contract.
//!
//! The full virtual memory subsystem (page tables, zone allocation, demand
//! paging outside of file-backed zones) is out of scope here; this module
//! only carries the narrow surface the VFS mmap path needs to install and
//! service `vm_ops` on a memory zone: a page-granular user-copy primitive,
//! TLB invalidation, and random zone placement in an address space.

use x86_64::VirtAddr;

pub const VMM_PAGE_SIZE: u64 = 4096;

pub const fn page_start(vaddr: u64) -> u64 {
    vaddr & !(VMM_PAGE_SIZE - 1)
}

/// An address space able to place and release mmap'd zones. The real
/// process/virtual-memory subsystem would implement this against its page
/// tables; nothing here assumes more than "reserve N bytes, tell me where,
/// and later let me invalidate one page's TLB entry there".
pub trait AddressSpace: Send {
    fn alloc_random_zone(&mut self, size: u64) -> Result<u64, &'static str>;
    fn flush_local_tlb_entry(&mut self, vaddr: u64);
}

/// Copy a page's worth of kernel-resident bytes into a physically-mapped
/// user address. Real systems route this through the page tables; this
/// bare-metal primitive assumes `dst_user` is already mapped and writable
/// (true for a freshly-faulted-in private page, the only caller).
pub fn copy_to_user(dst_user: u64, src_kernel: &[u8]) {
    unsafe {
        let dst = dst_user as *mut u8;
        core::ptr::copy_nonoverlapping(src_kernel.as_ptr(), dst, src_kernel.len());
    }
}

pub fn flush_local_tlb_entry(vaddr: u64) {
    x86_64::instructions::tlb::flush(VirtAddr::new(vaddr));
}
