//! Basic Memory Management for RustOS
//!
//! Simple memory management without heap allocation (for incremental development)

use bootloader::bootinfo::MemoryRegion;

/// Page size constants
pub const PAGE_SIZE: usize = 4096;

/// Memory layout constants for virtual address space
/// Note: Using address well past kernel load area, identity-mapped by bootloader
pub const KERNEL_HEAP_START: usize = 0x_0080_0000; // 8MB - past kernel, safe region
pub const KERNEL_HEAP_SIZE: usize = 16 * 1024 * 1024; // 16 MiB heap

/// Simple memory statistics
#[derive(Debug, Clone)]
pub struct MemoryStats {
    pub total_memory: usize,
    pub usable_memory: usize,
    pub memory_regions: usize,
}

/// Analyze memory map from bootloader
pub fn analyze_memory_map(memory_regions: &[MemoryRegion]) -> MemoryStats {
    let mut total_memory = 0;
    let mut usable_memory = 0;
    let memory_regions_count = memory_regions.len();

    for region in memory_regions {
        let size = region.range.end_addr() - region.range.start_addr();
        total_memory += size as usize;

        if region.region_type == bootloader::bootinfo::MemoryRegionType::Usable {
            usable_memory += size as usize;
        }
    }

    MemoryStats {
        total_memory,
        usable_memory,
        memory_regions: memory_regions_count,
    }
}

/// Initialize memory management system (simplified)
pub fn init_memory(
    memory_regions: &[MemoryRegion],
    _physical_memory_offset: x86_64::VirtAddr,
) -> Result<MemoryStats, &'static str> {
    Ok(analyze_memory_map(memory_regions))
}

/// Utility function to align up to nearest boundary
pub fn align_up(addr: usize, align: usize) -> usize {
    (addr + align - 1) & !(align - 1)
}

/// Utility function to align down to nearest boundary
pub fn align_down(addr: usize, align: usize) -> usize {
    addr & !(align - 1)
}

/// Initialize the kernel heap allocator using memory from the bootloader memory map
pub fn init_heap(allocator: &linked_list_allocator::LockedHeap) -> Result<(), &'static str> {
    // Use the static heap region defined in memory constants
    // For early boot, we use a simple approach
    unsafe {
        allocator.lock().init(KERNEL_HEAP_START, KERNEL_HEAP_SIZE);
    }
    Ok(())
}

/// Initialize the kernel heap from bootloader memory map
/// This finds usable memory and sets up the heap there
///
/// # Arguments
/// * `allocator` - The heap allocator to initialize
/// * `memory_regions` - Memory map from bootloader
/// * `physical_memory_offset` - Offset where physical memory is mapped in virtual space
pub fn init_heap_from_memory_map(
    allocator: &linked_list_allocator::LockedHeap,
    memory_regions: &[MemoryRegion],
    physical_memory_offset: u64,
) -> Result<(), &'static str> {
    // Find a usable memory region that's large enough for the heap
    // Skip the first 1MB to avoid conflicts with low memory
    const MIN_HEAP_ADDR: u64 = 0x10_0000; // 1MB
    const DESIRED_HEAP_SIZE: usize = 16 * 1024 * 1024; // 16MB

    for region in memory_regions {
        if region.region_type != bootloader::bootinfo::MemoryRegionType::Usable {
            continue;
        }

        let phys_start = region.range.start_addr();
        let phys_end = region.range.end_addr();
        let size = (phys_end - phys_start) as usize;

        // Skip regions that start too low
        if phys_start < MIN_HEAP_ADDR {
            continue;
        }

        // Check if region is large enough
        if size >= DESIRED_HEAP_SIZE {
            // Convert physical address to virtual address using the offset
            let virt_start = phys_start + physical_memory_offset;
            let heap_size = DESIRED_HEAP_SIZE.min(size);

            unsafe {
                allocator.lock().init(virt_start as usize, heap_size);
            }
            return Ok(());
        }
    }

    Err("No suitable memory region found for heap")
}
