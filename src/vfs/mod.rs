//! Virtual File System (VFS) layer.
//!
//! Ties together the device table (C1), filesystem driver registry (C2),
//! dentry cache (C3), file-descriptor objects (C4), path resolver (C5),
//! mount manager (C6), permission engine (C7), and the mmap page-fault
//! hook (C9) behind one public operation surface (C8). `VfsState` is the
//! single object instantiating all of it; `init()` wires up the reference
//! `ramfs` driver as the root filesystem.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use spin::Mutex;

pub mod dentry;
pub mod device;
pub mod error;
pub mod file_descriptor;
pub mod fs_ops;
pub mod inode;
pub mod mmap;
pub mod mount;
pub mod path;
pub mod permission;
pub mod ramfs;
pub mod resolver;
pub mod types;

#[cfg(test)]
pub mod examples;

pub use dentry::Dentry;
pub use error::{VfsError, VfsResult};
pub use file_descriptor::{FileDescriptor, OpenFileTable};
pub use inode::{Inode, InodeType};
pub use permission::Credentials;
pub use types::{DirEntry, OpenFlags, SeekFrom, Stat};

use dentry::dentry_cache;
use device::{Device, DeviceKind, DeviceTable};
use fs_ops::FsRegistry;
use inode::S_IFREG;
use mount::{MountTable, ROOT_INODE_INDX};
use ramfs::RamFs;

/// The root device id assigned to the in-memory root filesystem at boot.
pub const ROOT_DEVICE_ID: u32 = 0;

pub struct VfsState {
    registry: FsRegistry,
    devices: DeviceTable,
    mounts: MountTable,
    files: Mutex<OpenFileTable>,
}

impl VfsState {
    pub const fn new() -> Self {
        Self {
            registry: FsRegistry::new(),
            devices: DeviceTable::new(),
            mounts: MountTable::new(),
            files: Mutex::new(OpenFileTable::new()),
        }
    }

    /// Register the reference ramfs driver and mount it as the root
    /// filesystem on a synthetic virtual device. Callers are expected to
    /// call this exactly once at boot.
    pub fn init(&self) -> VfsResult<()> {
        let ramfs = RamFs::new();
        self.registry.add_driver("ramfs", ramfs)?;

        let device = Device {
            dev_id: ROOT_DEVICE_ID,
            kind: DeviceKind::Storage,
            is_virtual: true,
        };
        self.devices.add_device(device, &self.registry)?;
        Ok(())
    }

    pub fn root(&self) -> VfsResult<Dentry> {
        let dev_id = self.devices.root_device_id()?;
        let fs_index = self.devices.fs_index_for(dev_id)?;
        let ops = self.registry.get(fs_index)?;
        dentry_cache().get(dev_id, ROOT_INODE_INDX, &ops)
    }

    pub fn resolve(&self, path: &str) -> VfsResult<Dentry> {
        let root = self.root()?;
        resolver::resolve_path(&root, None, path)
    }

    pub fn open(&self, path: &str, flags: OpenFlags, mode: u32) -> VfsResult<i32> {
        self.open_as(path, flags, mode, None)
    }

    /// Full `open` gating sequence, parameterised over the calling thread's
    /// credentials (C7). `creds == None` models an in-kernel caller and
    /// skips all permission checks, same as `check_access`'s own contract.
    pub fn open_as(
        &self,
        path: &str,
        flags: OpenFlags,
        mode: u32,
        creds: Option<&permission::Credentials>,
    ) -> VfsResult<i32> {
        let root = self.root()?;
        let dentry = match resolver::resolve_path(&root, None, path) {
            Ok(dentry) => dentry,
            Err(VfsError::NotFound) if flags.has_flag(OpenFlags::CREAT) => {
                let (parent, name) = resolver::resolve_parent(&root, None, path)?;
                permission::check_access(parent.inode(), creds, permission::Access::Write)?;
                let new_ino = parent
                    .ops()
                    .create(parent.inode_indx(), &name, mode | S_IFREG)?;
                let ops = parent.ops().clone();
                let created = dentry_cache().get(parent.dev_id(), new_ino, &ops)?;
                created.rebind(&parent, &name);
                created
            }
            Err(e) => return Err(e),
        };

        if dentry.flags().contains(dentry::DentryFlags::PRIVATE) {
            return Err(VfsError::PermissionDenied);
        }

        let is_dir = dentry.is_dir();
        if is_dir && !flags.has_flag(OpenFlags::DIRECTORY) {
            return Err(VfsError::IsDirectory);
        }

        if flags.is_exec() {
            permission::check_access(dentry.inode(), creds, permission::Access::Execute)?;
        }
        if flags.is_writable() {
            permission::check_access(dentry.inode(), creds, permission::Access::Write)?;
        }
        if flags.is_readable() {
            permission::check_access(dentry.inode(), creds, permission::Access::Read)?;
        }

        if is_dir && flags.is_writable() {
            return Err(VfsError::IsDirectory);
        }

        // A filesystem-specific `open` hook can route the open to a
        // device handler; `NotSupported` is the "no override" sentinel,
        // same convention as the mmap driver hook.
        match dentry.ops().open(dentry.inode_indx(), flags) {
            Ok(()) | Err(VfsError::NotSupported) => {}
            Err(e) => return Err(e),
        }

        if flags.has_flag(OpenFlags::TRUNC) {
            let _ = dentry.ops().truncate(dentry.inode_indx(), 0);
        }

        let fd = FileDescriptor::new(dentry, flags);
        self.files.lock().insert(fd)
    }

    pub fn close(&self, fd: i32) -> VfsResult<()> {
        self.files.lock().remove(fd)
    }

    pub fn read(&self, fd: i32, buf: &mut [u8]) -> VfsResult<usize> {
        self.files.lock().get(fd)?.read(buf)
    }

    pub fn write(&self, fd: i32, buf: &[u8]) -> VfsResult<usize> {
        self.files.lock().get(fd)?.write(buf)
    }

    pub fn seek(&self, fd: i32, from: SeekFrom) -> VfsResult<u64> {
        self.files.lock().get(fd)?.seek(from)
    }

    pub fn fstat(&self, fd: i32) -> VfsResult<Stat> {
        self.files.lock().get(fd)?.stat()
    }

    pub fn fsync(&self, fd: i32) -> VfsResult<()> {
        self.files.lock().get(fd)?.sync()
    }

    pub fn dup(&self, fd: i32) -> VfsResult<i32> {
        self.files.lock().duplicate(fd)
    }

    pub fn dup2(&self, oldfd: i32, newfd: i32) -> VfsResult<i32> {
        self.files.lock().duplicate_to(oldfd, newfd)
    }

    pub fn stat(&self, path: &str) -> VfsResult<Stat> {
        self.resolve(path)?.stat()
    }

    pub fn mkdir(&self, path: &str, mode: u32) -> VfsResult<()> {
        let root = self.root()?;
        let (parent, name) = resolver::resolve_parent(&root, None, path)?;
        permission::check_access(parent.inode(), None, permission::Access::Write)?;
        parent.ops().mkdir(parent.inode_indx(), &name, mode)?;
        Ok(())
    }

    /// Refuses mountpoints, mounted roots, and any dentry with `d_count !=
    /// 1` (busy, i.e. held open by something other than this call's own
    /// reference) before delegating to the filesystem.
    pub fn rmdir(&self, path: &str) -> VfsResult<()> {
        let root = self.root()?;
        let target = resolver::resolve_path(&root, None, path)?;
        if !target.is_dir() {
            return Err(VfsError::NotDirectory);
        }
        let flags = target.flags();
        if flags.contains(dentry::DentryFlags::MOUNTPOINT)
            || flags.contains(dentry::DentryFlags::MOUNTED)
        {
            return Err(VfsError::Busy);
        }
        if dentry::DentryInner::d_count(&target) != 1 {
            return Err(VfsError::Busy);
        }
        let (parent, name) = resolver::resolve_parent(&root, None, path)?;
        parent.ops().rmdir(parent.inode_indx(), &name)?;
        target.set_flag(dentry::DentryFlags::INODE_TO_BE_DELETED);
        Ok(())
    }

    /// Remove a directory entry. The inode itself is only actually freed
    /// when the dentry's last strong reference drops (`Drop for
    /// DentryInner`), so a file `unlink`ed while still open through a
    /// live fd stays readable/writable until that fd is closed too.
    pub fn unlink(&self, path: &str) -> VfsResult<()> {
        let root = self.root()?;
        let target = resolver::resolve_path(&root, None, path)?;
        if target.is_dir() {
            return Err(VfsError::PermissionDenied);
        }
        let (parent, name) = resolver::resolve_parent(&root, None, path)?;
        parent.ops().unlink(parent.inode_indx(), &name)?;
        if target.inode().links_count() == 1 {
            target.set_flag(dentry::DentryFlags::INODE_TO_BE_DELETED);
        }
        Ok(())
    }

    pub fn getdents(&self, path: &str) -> VfsResult<Vec<DirEntry>> {
        let dentry = self.resolve(path)?;
        if !dentry.is_dir() {
            return Err(VfsError::NotDirectory);
        }
        dentry.ops().getdents(dentry.inode_indx())
    }

    /// fd-based counterpart to `getdents`: offset-tracked and delegated
    /// under the fd's own lock rather than resolving a path fresh each call.
    pub fn getdents_fd(&self, fd: i32) -> VfsResult<Vec<DirEntry>> {
        self.files.lock().get(fd)?.getdents()
    }

    pub fn absolute_path(&self, dentry: &Dentry, max_len: usize) -> VfsResult<String> {
        let root = self.root()?;
        path::absolute_path(&root, dentry, max_len)
    }

    pub fn mount(&self, mountpoint: &str, device: Device, fs_name: &str) -> VfsResult<()> {
        let root = self.root()?;
        let mountpoint_dentry = resolver::resolve_path(&root, None, mountpoint)?;
        let fs_index = self.registry.index_by_name(fs_name)?;
        self.mounts.mount(
            &self.devices,
            &self.registry,
            &mountpoint_dentry,
            device,
            fs_index,
        )
    }

    pub fn umount(&self, mountpoint: &str) -> VfsResult<()> {
        let root = self.root()?;
        let mounted_root = resolver::resolve_path(&root, None, mountpoint)?;
        self.mounts.umount(&mounted_root)
    }

    pub fn mmap(
        &self,
        fd: i32,
        request: mmap::MmapRequest,
        space: &mut dyn crate::vmm::AddressSpace,
    ) -> VfsResult<mmap::MemoryZone> {
        let dentry = self.files.lock().get(fd)?.dentry();
        mmap::mmap(&dentry, request, space)
    }

    pub fn munmap(
        &self,
        zone: mmap::MemoryZone,
        space: &mut dyn crate::vmm::AddressSpace,
    ) -> VfsResult<()> {
        mmap::munmap(zone, space)
    }
}

static VFS: VfsState = VfsState::new();

pub fn get_vfs() -> &'static VfsState {
    &VFS
}

pub fn init() -> VfsResult<()> {
    VFS.init()
}

pub fn vfs_open(path: &str, flags: OpenFlags, mode: u32) -> VfsResult<i32> {
    get_vfs().open(path, flags, mode)
}

pub fn vfs_close(fd: i32) -> VfsResult<()> {
    get_vfs().close(fd)
}

pub fn vfs_read(fd: i32, buf: &mut [u8]) -> VfsResult<usize> {
    get_vfs().read(fd, buf)
}

pub fn vfs_write(fd: i32, buf: &[u8]) -> VfsResult<usize> {
    get_vfs().write(fd, buf)
}

pub fn vfs_seek(fd: i32, from: SeekFrom) -> VfsResult<u64> {
    get_vfs().seek(fd, from)
}

pub fn vfs_stat(path: &str) -> VfsResult<Stat> {
    get_vfs().stat(path)
}

pub fn vfs_fstat(fd: i32) -> VfsResult<Stat> {
    get_vfs().fstat(fd)
}

pub fn vfs_mkdir(path: &str, mode: u32) -> VfsResult<()> {
    get_vfs().mkdir(path, mode)
}

pub fn vfs_rmdir(path: &str) -> VfsResult<()> {
    get_vfs().rmdir(path)
}

pub fn vfs_unlink(path: &str) -> VfsResult<()> {
    get_vfs().unlink(path)
}

pub fn vfs_readdir(path: &str) -> VfsResult<Vec<DirEntry>> {
    get_vfs().getdents(path)
}

pub fn vfs_getdents(fd: i32) -> VfsResult<Vec<DirEntry>> {
    get_vfs().getdents_fd(fd)
}

pub fn vfs_fsync(fd: i32) -> VfsResult<()> {
    get_vfs().fsync(fd)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_vfs() -> VfsState {
        let vfs = VfsState::new();
        vfs.init().unwrap();
        vfs
    }

    #[test_case]
    fn root_resolves_to_a_directory() {
        let vfs = fresh_vfs();
        let root = vfs.root().unwrap();
        assert!(root.is_dir());
    }

    #[test_case]
    fn create_write_read_roundtrip() {
        let vfs = fresh_vfs();
        let fd = vfs
            .open(
                "/hello.txt",
                OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
                0o644,
            )
            .unwrap();
        vfs.write(fd, b"hi there").unwrap();
        vfs.seek(fd, SeekFrom::Start(0)).unwrap();
        let mut buf = [0u8; 8];
        let n = vfs.read(fd, &mut buf).unwrap();
        assert_eq!(n, 8);
        assert_eq!(&buf, b"hi there");
        vfs.close(fd).unwrap();
    }

    #[test_case]
    fn mkdir_then_getdents_lists_entry() {
        let vfs = fresh_vfs();
        vfs.mkdir("/sub", 0o755).unwrap();
        let entries = vfs.getdents("/").unwrap();
        assert!(entries.iter().any(|e| e.name == "sub"));
    }

    #[test_case]
    fn dotdot_returns_to_root() {
        let vfs = fresh_vfs();
        vfs.mkdir("/sub", 0o755).unwrap();
        let via_dotdot = vfs.resolve("/sub/..").unwrap();
        let root = vfs.root().unwrap();
        assert!(alloc::sync::Arc::ptr_eq(&via_dotdot, &root));
    }

    #[test_case]
    fn dot_and_dotdot_compose_to_the_same_dentry() {
        let vfs = fresh_vfs();
        vfs.mkdir("/a", 0o755).unwrap();
        vfs.open(
            "/a/b",
            OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
            0o644,
        )
        .unwrap();

        let direct = vfs.resolve("/a/b").unwrap();
        let via_dot = vfs.resolve("/a/./b").unwrap();
        let via_dotdot = vfs.resolve("/a/../a/b").unwrap();

        assert!(alloc::sync::Arc::ptr_eq(&direct, &via_dot));
        assert!(alloc::sync::Arc::ptr_eq(&direct, &via_dotdot));
        assert_eq!(vfs.absolute_path(&direct, 64).unwrap(), "/a/b");
    }

    #[test_case]
    fn unlink_while_open_keeps_file_usable() {
        let vfs = fresh_vfs();
        let fd = vfs
            .open(
                "/a.txt",
                OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
                0o644,
            )
            .unwrap();
        vfs.write(fd, b"data").unwrap();
        vfs.unlink("/a.txt").unwrap();

        // Deleted from the namespace...
        assert_eq!(vfs.stat("/a.txt").unwrap_err(), VfsError::NotFound);

        // ...but still usable through the fd opened before the unlink.
        vfs.seek(fd, SeekFrom::Start(0)).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(vfs.read(fd, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"data");

        vfs.close(fd).unwrap();
    }

    #[test_case]
    fn fstat_reflects_writes_through_a_still_open_fd() {
        let vfs = fresh_vfs();
        let fd = vfs
            .open(
                "/grown.txt",
                OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
                0o644,
            )
            .unwrap();
        assert_eq!(vfs.fstat(fd).unwrap().size, 0);

        vfs.write(fd, b"0123456789").unwrap();
        // The dentry behind this fd is still live; its cached inode must
        // not be frozen at the size it had when the fd was opened.
        assert_eq!(vfs.fstat(fd).unwrap().size, 10);

        vfs.close(fd).unwrap();
    }

    #[test_case]
    fn seek_end_and_append_see_the_post_write_size() {
        let vfs = fresh_vfs();
        let fd = vfs
            .open(
                "/tail.txt",
                OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
                0o644,
            )
            .unwrap();
        vfs.write(fd, b"0123456789").unwrap();

        assert_eq!(vfs.seek(fd, SeekFrom::End(0)).unwrap(), 10);
        vfs.close(fd).unwrap();

        let append_fd = vfs
            .open(
                "/tail.txt",
                OpenFlags::new(OpenFlags::WRONLY | OpenFlags::APPEND),
                0,
            )
            .unwrap();
        vfs.write(append_fd, b"abc").unwrap();
        assert_eq!(vfs.fstat(append_fd).unwrap().size, 13);
        vfs.close(append_fd).unwrap();
    }

    #[test_case]
    fn getdents_fd_tracks_offset_across_calls() {
        let vfs = fresh_vfs();
        vfs.mkdir("/listing", 0o755).unwrap();
        vfs.mkdir("/listing/a", 0o755).unwrap();
        vfs.mkdir("/listing/b", 0o755).unwrap();

        let fd = vfs
            .open(
                "/listing",
                OpenFlags::new(OpenFlags::RDONLY | OpenFlags::DIRECTORY),
                0,
            )
            .unwrap();

        let mut seen = alloc::vec::Vec::new();
        loop {
            let batch = vfs.getdents_fd(fd).unwrap();
            if batch.is_empty() {
                break;
            }
            seen.extend(batch.into_iter().map(|e| e.name));
        }
        seen.sort();
        assert_eq!(
            seen,
            alloc::vec![
                String::from("."),
                String::from(".."),
                String::from("a"),
                String::from("b")
            ]
        );

        // Exhausted: another call returns an empty batch, not an error.
        assert!(vfs.getdents_fd(fd).unwrap().is_empty());
        vfs.close(fd).unwrap();
    }

    #[test_case]
    fn dup_shares_offset() {
        let vfs = fresh_vfs();
        let fd = vfs
            .open(
                "/dup.txt",
                OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
                0o644,
            )
            .unwrap();
        vfs.write(fd, b"0123456789").unwrap();
        vfs.seek(fd, SeekFrom::Start(0)).unwrap();

        let dupfd = vfs.dup(fd).unwrap();
        let mut buf = [0u8; 4];
        vfs.read(fd, &mut buf).unwrap();
        assert_eq!(&buf, b"0123");

        let mut buf2 = [0u8; 4];
        vfs.read(dupfd, &mut buf2).unwrap();
        assert_eq!(&buf2, b"4567"); // shares the offset fd advanced

        vfs.close(fd).unwrap();
        vfs.close(dupfd).unwrap();
    }

    #[test_case]
    fn mount_and_umount_roundtrip() {
        let vfs = fresh_vfs();
        vfs.mkdir("/mnt", 0o755).unwrap();

        let second = RamFs::new();
        vfs.registry.add_driver("ramfs2", second).unwrap();

        let device = Device {
            dev_id: 7,
            kind: DeviceKind::Storage,
            is_virtual: true,
        };
        vfs.mount("/mnt", device, "ramfs2").unwrap();

        vfs.mkdir("/mnt/child", 0o755).unwrap();
        let entries = vfs.getdents("/mnt").unwrap();
        assert!(entries.iter().any(|e| e.name == "child"));

        vfs.umount("/mnt").unwrap();
        let entries = vfs.getdents("/mnt").unwrap();
        // Back to the (empty) ramfs directory: nothing but its own seeded
        // "." and ".." entries remain.
        assert!(entries.iter().all(|e| e.name == "." || e.name == ".."));
    }

    #[test_case]
    fn rmdir_refuses_directory_that_is_still_open() {
        let vfs = fresh_vfs();
        vfs.mkdir("/busy", 0o755).unwrap();
        let held = vfs.resolve("/busy").unwrap();

        assert_eq!(vfs.rmdir("/busy").unwrap_err(), VfsError::Busy);

        drop(held);
        vfs.rmdir("/busy").unwrap();
    }

    #[test_case]
    fn rmdir_refuses_mountpoint() {
        let vfs = fresh_vfs();
        vfs.mkdir("/mnt", 0o755).unwrap();
        let second = RamFs::new();
        vfs.registry.add_driver("ramfs3", second).unwrap();
        let device = Device {
            dev_id: 9,
            kind: DeviceKind::Storage,
            is_virtual: true,
        };
        vfs.mount("/mnt", device, "ramfs3").unwrap();

        assert_eq!(vfs.rmdir("/mnt").unwrap_err(), VfsError::Busy);
        vfs.umount("/mnt").unwrap();
    }

    #[test_case]
    fn unlink_on_directory_is_eperm_not_eisdir() {
        let vfs = fresh_vfs();
        vfs.mkdir("/adir", 0o755).unwrap();
        assert_eq!(vfs.unlink("/adir").unwrap_err(), VfsError::PermissionDenied);
    }

    #[test_case]
    fn open_directory_without_o_directory_is_eisdir() {
        let vfs = fresh_vfs();
        vfs.mkdir("/adir", 0o755).unwrap();
        assert_eq!(
            vfs.open("/adir", OpenFlags::new(OpenFlags::RDONLY), 0).unwrap_err(),
            VfsError::IsDirectory
        );
        vfs.open(
            "/adir",
            OpenFlags::new(OpenFlags::RDONLY | OpenFlags::DIRECTORY),
            0,
        )
        .unwrap();
    }

    #[test_case]
    fn open_wronly_on_directory_is_eisdir() {
        let vfs = fresh_vfs();
        vfs.mkdir("/adir", 0o755).unwrap();
        assert_eq!(
            vfs.open(
                "/adir",
                OpenFlags::new(OpenFlags::WRONLY | OpenFlags::DIRECTORY),
                0
            )
            .unwrap_err(),
            VfsError::IsDirectory
        );
    }

    #[test_case]
    fn open_as_denies_read_without_matching_permission_bits() {
        let vfs = fresh_vfs();
        let fd = vfs
            .open(
                "/secret.txt",
                OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
                0o600,
            )
            .unwrap();
        vfs.close(fd).unwrap();

        let outsider = permission::Credentials {
            uid: 99,
            gid: 99,
            is_super_user: false,
        };
        assert_eq!(
            vfs.open_as(
                "/secret.txt",
                OpenFlags::new(OpenFlags::RDONLY),
                0,
                Some(&outsider),
            )
            .unwrap_err(),
            VfsError::PermissionDenied
        );
    }

    struct TestAddressSpace {
        next: u64,
    }

    impl crate::vmm::AddressSpace for TestAddressSpace {
        fn alloc_random_zone(&mut self, size: u64) -> Result<u64, &'static str> {
            let start = self.next;
            self.next += size;
            Ok(start)
        }

        fn flush_local_tlb_entry(&mut self, _vaddr: u64) {}
    }

    #[test_case]
    fn mmap_private_then_munmap_drops_one_dentry_reference() {
        let vfs = fresh_vfs();
        let fd = vfs
            .open(
                "/mapped.txt",
                OpenFlags::new(OpenFlags::RDWR | OpenFlags::CREAT),
                0o644,
            )
            .unwrap();
        vfs.write(fd, b"mmap data").unwrap();

        let dentry_before = vfs.resolve("/mapped.txt").unwrap();
        let count_before = dentry::DentryInner::d_count(&dentry_before);

        let mut space = TestAddressSpace { next: 0x4000_0000 };
        let zone = vfs
            .mmap(
                fd,
                mmap::MmapRequest {
                    size: crate::vmm::VMM_PAGE_SIZE,
                    offset: 0,
                    kind: mmap::MapKind::Private,
                },
                &mut space,
            )
            .unwrap();
        assert_eq!(
            dentry::DentryInner::d_count(&dentry_before),
            count_before + 1
        );

        vfs.munmap(zone, &mut space).unwrap();
        assert_eq!(dentry::DentryInner::d_count(&dentry_before), count_before);

        vfs.close(fd).unwrap();
    }

    #[test_case]
    fn permission_other_requires_both_uid_and_gid_mismatch() {
        use permission::{check_access, Access, Credentials};
        let inode = Inode::new(0o640, 1, 1, 0, 1);
        let same_gid_different_uid = Credentials {
            uid: 2,
            gid: 1,
            is_super_user: false,
        };
        // Group bit (0o040) isn't set, and this caller shares the inode's
        // gid, so it never falls through to the "other" branch at all.
        assert_eq!(
            check_access(&inode, Some(&same_gid_different_uid), Access::Read).unwrap_err(),
            VfsError::PermissionDenied
        );
    }
}
