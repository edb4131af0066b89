//! Thin boot entry point.
//!
//! Brings up just enough of the kernel to demonstrate VFS boot-time wiring:
//! serial console, heap, structured logging, error handling, the monotonic
//! clock, then the VFS itself mounted on its reference `ramfs` driver. The
//! rest of the original desktop/graphics/network/process-management stack
//! this repo once booted into lives on only as history — this binary's job
//! is to prove the VFS layer wires up end to end at boot, not to run a
//! desktop.

#![no_std]
#![no_main]

extern crate alloc;

use alloc::string::String;
use bootloader::{entry_point, BootInfo};
use core::panic::PanicInfo;

use rustos::vfs::{self, OpenFlags};
use rustos::{error, log_error, log_info, logging, memory_basic, serial_println, time, ALLOCATOR};

entry_point!(kernel_main);

fn kernel_main(boot_info: &'static BootInfo) -> ! {
    serial_println!("RustOS: kernel entry point reached");

    memory_basic::init_heap_from_memory_map(
        &ALLOCATOR,
        &boot_info.memory_map,
        boot_info.physical_memory_offset,
    )
    .expect("failed to initialize kernel heap");
    serial_println!("RustOS: heap initialized");

    logging::init_logging();
    error::init_error_handling();

    match time::init() {
        Ok(()) => {
            let stats = time::get_timer_stats();
            log_info!("kernel", "monotonic clock calibrated at {} Hz", stats.tsc_frequency_hz);
        }
        Err(e) => log_error!("kernel", "clock calibration failed: {}", e),
    }

    match vfs::init() {
        Ok(()) => log_info!("kernel", "VFS initialized, root filesystem is ramfs"),
        Err(e) => {
            log_error!("kernel", "VFS initialization failed: {}", e);
            halt_loop();
        }
    }

    demonstrate_vfs();

    log_info!("kernel", "boot sequence complete, idling");
    halt_loop();
}

/// Exercises the public VFS surface once at boot, the same way the
/// original boot sequence logged each subsystem's readiness.
fn demonstrate_vfs() {
    if let Err(e) = vfs::vfs_mkdir("/etc", 0o755) {
        log_error!("kernel", "mkdir /etc failed: {}", e);
        return;
    }

    let fd = match vfs::vfs_open(
        "/etc/motd",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    ) {
        Ok(fd) => fd,
        Err(e) => {
            log_error!("kernel", "open /etc/motd failed: {}", e);
            return;
        }
    };

    let banner = b"Welcome to RustOS\n";
    if let Err(e) = vfs::vfs_write(fd, banner) {
        log_error!("kernel", "write /etc/motd failed: {}", e);
    }

    if let Err(e) = vfs::vfs_fsync(fd) {
        log_error!("kernel", "fsync /etc/motd failed: {}", e);
    }

    let _ = vfs::vfs_close(fd);

    match vfs::vfs_readdir("/etc") {
        Ok(entries) => {
            let names: String = entries
                .iter()
                .map(|e| e.name.as_str())
                .collect::<alloc::vec::Vec<_>>()
                .join(", ");
            log_info!("kernel", "/etc contains: {}", names);
        }
        Err(e) => log_error!("kernel", "readdir /etc failed: {}", e),
    }
}

fn halt_loop() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    use rustos::error::{ErrorContext, ErrorSeverity, KernelError, SystemError, ERROR_MANAGER};

    let context = ErrorContext::new(
        KernelError::System(SystemError::InternalError),
        ErrorSeverity::Fatal,
        "panic_handler",
        alloc::format!("{}", info),
    );

    if let Some(mut manager) = ERROR_MANAGER.try_lock() {
        let _ = manager.handle_error(context);
    } else {
        serial_println!("KERNEL PANIC (error manager unavailable): {}", info);
    }

    halt_loop()
}
