//! RustOS library crate.
//!
//! Hosts every subsystem that survives the trim down to a VFS demonstration
//! kernel: early serial output, the heap allocator, structured logging,
//! error handling/recovery, the monotonic clock, the virtual memory
//! collaborator contract, and the VFS itself. `src/main.rs` is a thin
//! `entry_point!` shim over this crate; `tests/integration_test.rs` links
//! against it the same way so integration tests exercise the real `vfs`
//! module rather than a copy.
//!
//! Also hosts the kernel's `#[test_case]` harness: `#![no_main]` only under
//! `cfg(test)` so a normal `cargo build` still produces an ordinary library,
//! while `cargo test` replaces the generated harness with `test_main`
//! invoked from our own `entry_point!`, matching the convention QEMU's
//! `isa-debug-exit` device and the `bootimage` `test-success-exit-code`
//! metadata in `Cargo.toml` expect.

#![no_std]
#![cfg_attr(test, no_main)]
#![feature(custom_test_frameworks)]
#![test_runner(crate::test_runner)]
#![reexport_test_harness_main = "test_main"]

extern crate alloc;

use core::panic::PanicInfo;
use linked_list_allocator::LockedHeap;

pub mod error;
pub mod intrinsics;
pub mod logging;
pub mod memory_basic;
pub mod serial;
pub mod time;
pub mod vfs;
pub mod vmm;

/// The kernel's single heap, initialized from the bootloader's memory map
/// by `main.rs` before anything under `alloc` runs. Empty at link time;
/// `memory_basic::init_heap_from_memory_map` locates real backing memory.
#[global_allocator]
pub static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// QEMU's `isa-debug-exit` device interprets a written value `v` as exit
/// code `(v << 1) | 1`, so `Success = 0x10` yields the `33` this crate's
/// `[package.metadata.bootimage] test-success-exit-code` expects.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QemuExitCode {
    Success = 0x10,
    Failed = 0x11,
}

pub fn exit_qemu(exit_code: QemuExitCode) -> ! {
    use x86_64::instructions::port::Port;

    unsafe {
        let mut port = Port::new(0xf4);
        port.write(exit_code as u32);
    }

    // The isa-debug-exit write above terminates QEMU; loop in case it
    // doesn't (e.g. running outside QEMU during local iteration).
    loop {
        x86_64::instructions::hlt();
    }
}

/// The `#[test_runner]` for every `#[test_case]` in this crate, lib unit
/// tests and `tests/integration_test.rs` alike.
pub fn test_runner(tests: &[&dyn Fn()]) {
    serial_println!("Running {} tests", tests.len());
    for test in tests {
        test();
    }
    exit_qemu(QemuExitCode::Success);
}

pub fn test_panic_handler(info: &PanicInfo) -> ! {
    serial_println!("[failed]\n");
    serial_println!("Error: {}\n", info);
    exit_qemu(QemuExitCode::Failed);
}

#[cfg(test)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    test_panic_handler(info)
}

#[cfg(test)]
bootloader::entry_point!(test_kernel_main);

#[cfg(test)]
fn test_kernel_main(boot_info: &'static bootloader::BootInfo) -> ! {
    memory_basic::init_heap_from_memory_map(
        &ALLOCATOR,
        &boot_info.memory_map,
        boot_info.physical_memory_offset,
    )
    .expect("failed to initialize heap for test harness");

    test_main();
    loop {
        x86_64::instructions::hlt();
    }
}
