//! VFS usage examples.
//!
//! Worked demonstrations of the public operation surface, kept as plain
//! functions (not wired into the test harness) since they all share the
//! one process-global `VfsState` and would otherwise race each other's
//! fixture paths.

#![allow(dead_code)]

use alloc::format;
use super::*;
use crate::vfs::mmap::VmOps;

/// Example 1: basic file operations.
pub fn example_basic_file_ops() -> VfsResult<()> {
    init()?;

    let fd = vfs_open(
        "/hello.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    )?;
    let message = b"Hello, VFS!";
    vfs_write(fd, message)?;
    vfs_close(fd)?;

    let fd = vfs_open("/hello.txt", OpenFlags::new(OpenFlags::RDONLY), 0)?;
    let mut buffer = [0u8; 1024];
    let bytes_read = vfs_read(fd, &mut buffer)?;
    vfs_close(fd)?;

    assert_eq!(&buffer[..bytes_read], message);
    vfs_unlink("/hello.txt")?;

    Ok(())
}

/// Example 2: directory operations.
pub fn example_directory_ops() -> VfsResult<()> {
    init()?;

    vfs_mkdir("/tmp", 0o755)?;
    vfs_mkdir("/tmp/test", 0o755)?;

    let fd = vfs_open(
        "/tmp/test/file1.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    )?;
    vfs_write(fd, b"File 1 content")?;
    vfs_close(fd)?;

    let fd = vfs_open(
        "/tmp/test/file2.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    )?;
    vfs_write(fd, b"File 2 content")?;
    vfs_close(fd)?;

    let entries = vfs_readdir("/tmp/test")?;
    for entry in &entries {
        let _stat = vfs_stat(&format!("/tmp/test/{}", entry.name))?;
    }
    assert_eq!(entries.len(), 2);

    vfs_unlink("/tmp/test/file1.txt")?;
    vfs_unlink("/tmp/test/file2.txt")?;
    vfs_rmdir("/tmp/test")?;
    vfs_rmdir("/tmp")?;

    Ok(())
}

/// Example 3: seek operations.
pub fn example_seek_ops() -> VfsResult<()> {
    init()?;

    let fd = vfs_open(
        "/seektest.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    )?;
    vfs_write(fd, b"0123456789ABCDEF")?;

    vfs_seek(fd, SeekFrom::Start(5))?;
    let mut buffer = [0u8; 5];
    vfs_read(fd, &mut buffer)?;
    assert_eq!(&buffer, b"56789");

    vfs_seek(fd, SeekFrom::Current(-3))?;
    vfs_read(fd, &mut buffer[..2])?;
    assert_eq!(&buffer[..2], b"78");

    vfs_seek(fd, SeekFrom::End(-4))?;
    vfs_read(fd, &mut buffer[..4])?;
    assert_eq!(&buffer[..4], b"CDEF");

    vfs_close(fd)?;
    vfs_unlink("/seektest.txt")?;

    Ok(())
}

/// Example 4: file metadata.
pub fn example_file_metadata() -> VfsResult<()> {
    init()?;

    let fd = vfs_open(
        "/metadata.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    )?;
    vfs_write(fd, b"Some data for metadata testing")?;

    let stat = vfs_fstat(fd)?;
    assert_eq!(stat.inode_type, InodeType::File);
    assert_eq!(stat.size, 31);
    assert_eq!(stat.mode & 0o777, 0o644);

    vfs_close(fd)?;

    let stat = vfs_stat("/metadata.txt")?;
    assert_eq!(stat.size, 31);

    vfs_unlink("/metadata.txt")?;

    Ok(())
}

/// Example 5: append mode.
pub fn example_append_mode() -> VfsResult<()> {
    init()?;

    let fd = vfs_open(
        "/append.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    )?;
    vfs_write(fd, b"Line 1\n")?;
    vfs_close(fd)?;

    let fd = vfs_open(
        "/append.txt",
        OpenFlags::new(OpenFlags::WRONLY | OpenFlags::APPEND),
        0,
    )?;
    vfs_write(fd, b"Line 2\n")?;
    vfs_write(fd, b"Line 3\n")?;
    vfs_close(fd)?;

    let fd = vfs_open("/append.txt", OpenFlags::new(OpenFlags::RDONLY), 0)?;
    let mut buffer = [0u8; 1024];
    let bytes_read = vfs_read(fd, &mut buffer)?;
    vfs_close(fd)?;

    assert_eq!(&buffer[..bytes_read], b"Line 1\nLine 2\nLine 3\n");
    vfs_unlink("/append.txt")?;

    Ok(())
}

/// Example 6: truncate on open.
pub fn example_truncate() -> VfsResult<()> {
    init()?;

    let fd = vfs_open(
        "/trunc.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    )?;
    vfs_write(fd, b"This is a long text that will be truncated")?;
    let stat = vfs_fstat(fd)?;
    assert_eq!(stat.size, 43);
    vfs_close(fd)?;

    let fd = vfs_open(
        "/trunc.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::TRUNC),
        0,
    )?;
    let stat = vfs_fstat(fd)?;
    assert_eq!(stat.size, 0);

    vfs_write(fd, b"New content")?;
    let stat = vfs_fstat(fd)?;
    assert_eq!(stat.size, 11);

    vfs_close(fd)?;
    vfs_unlink("/trunc.txt")?;

    Ok(())
}

/// Example 7: error handling.
pub fn example_error_handling() -> VfsResult<()> {
    init()?;

    match vfs_open("/nonexistent.txt", OpenFlags::new(OpenFlags::RDONLY), 0) {
        Err(VfsError::NotFound) => {}
        _ => panic!("expected NotFound"),
    }

    match vfs_read(999, &mut [0u8; 10]) {
        Err(VfsError::BadFileDescriptor) => {}
        _ => panic!("expected BadFileDescriptor"),
    }

    Ok(())
}

/// Example 8: multiple independent file descriptors to the same file.
pub fn example_multiple_fds() -> VfsResult<()> {
    init()?;

    let fd = vfs_open(
        "/multi.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    )?;
    vfs_write(fd, b"0123456789")?;
    vfs_close(fd)?;

    let fd1 = vfs_open("/multi.txt", OpenFlags::new(OpenFlags::RDONLY), 0)?;
    let fd2 = vfs_open("/multi.txt", OpenFlags::new(OpenFlags::RDONLY), 0)?;

    vfs_seek(fd1, SeekFrom::Start(0))?;
    vfs_seek(fd2, SeekFrom::Start(5))?;

    let mut buf1 = [0u8; 5];
    let mut buf2 = [0u8; 5];
    vfs_read(fd1, &mut buf1)?;
    vfs_read(fd2, &mut buf2)?;

    assert_eq!(&buf1, b"01234");
    assert_eq!(&buf2, b"56789");

    vfs_close(fd1)?;
    vfs_close(fd2)?;
    vfs_unlink("/multi.txt")?;

    Ok(())
}

/// Example 9: `dup` shares the open-file offset.
pub fn example_dup() -> VfsResult<()> {
    init()?;

    let fd = vfs_open(
        "/dup.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    )?;
    vfs_write(fd, b"Test content for dup")?;

    let vfs = get_vfs();
    let fd_dup = vfs.dup(fd)?;

    vfs_seek(fd, SeekFrom::Start(0))?;

    let mut buf1 = [0u8; 4];
    let mut buf2 = [0u8; 4];
    vfs_read(fd, &mut buf1)?;
    vfs_read(fd_dup, &mut buf2)?; // continues from where fd left off

    assert_eq!(&buf1, b"Test");
    assert_eq!(&buf2, b" con");

    vfs_close(fd)?;
    vfs_close(fd_dup)?;
    vfs_unlink("/dup.txt")?;

    Ok(())
}

/// A toy address space just large enough to hand `mmap` somewhere to put a
/// zone; real placement and page-table bookkeeping belong to the process
/// subsystem this crate doesn't carry.
struct DemoAddressSpace {
    next_free: u64,
}

impl crate::vmm::AddressSpace for DemoAddressSpace {
    fn alloc_random_zone(&mut self, size: u64) -> Result<u64, &'static str> {
        let start = self.next_free;
        self.next_free += size;
        Ok(start)
    }

    fn flush_local_tlb_entry(&mut self, _vaddr: u64) {}
}

/// Example 10: mmap a file privately, fault a page in, then munmap.
pub fn example_mmap() -> VfsResult<()> {
    init()?;

    let fd = vfs_open(
        "/mmapped.txt",
        OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
        0o644,
    )?;
    vfs_write(fd, b"paged-in content")?;

    let mut space = DemoAddressSpace { next_free: 0x1000_0000 };
    let zone = get_vfs().mmap(
        fd,
        mmap::MmapRequest {
            size: crate::vmm::VMM_PAGE_SIZE,
            offset: 0,
            kind: mmap::MapKind::Private,
        },
        &mut space,
    )?;

    let dentry = zone.file.as_ref().expect("private file mapping carries a dentry");
    let vm_ops = mmap::FileVmOps;
    vm_ops.load_page_content(&zone, zone.start)?;
    let _ = dentry;

    get_vfs().munmap(zone, &mut space)?;
    vfs_close(fd)?;
    vfs_unlink("/mmapped.txt")?;

    Ok(())
}

/// Example 11: how a syscall layer would sit on top of this surface.
pub fn example_syscall_integration() {
    fn sys_open_impl(path: &str, flags: i32, mode: u32) -> i32 {
        let open_flags = OpenFlags::new(flags as u32);
        match vfs_open(path, open_flags, mode) {
            Ok(fd) => fd,
            Err(e) => e.errno(),
        }
    }

    fn sys_read_impl(fd: i32, buf: *mut u8, count: usize) -> isize {
        let buffer = unsafe { core::slice::from_raw_parts_mut(buf, count) };
        match vfs_read(fd, buffer) {
            Ok(n) => n as isize,
            Err(e) => e.errno() as isize,
        }
    }

    fn sys_write_impl(fd: i32, buf: *const u8, count: usize) -> isize {
        let buffer = unsafe { core::slice::from_raw_parts(buf, count) };
        match vfs_write(fd, buffer) {
            Ok(n) => n as isize,
            Err(e) => e.errno() as isize,
        }
    }

    fn sys_close_impl(fd: i32) -> i32 {
        match vfs_close(fd) {
            Ok(()) => 0,
            Err(e) => e.errno(),
        }
    }

    let _ = (
        sys_open_impl as fn(&str, i32, u32) -> i32,
        sys_read_impl as fn(i32, *mut u8, usize) -> isize,
        sys_write_impl as fn(i32, *const u8, usize) -> isize,
        sys_close_impl as fn(i32) -> i32,
    );
}
