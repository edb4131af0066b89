//! Reference filesystem driver: an in-memory tree keyed on inode number,
//! serving as the default root filesystem and the fixture for the VFS's
//! own tests. All data is lost on shutdown.
//!
//! Grounded on the structure of the previous `RamFsInode`/`BTreeMap`-backed
//! implementation, but reshaped around the `FsOps` contract (operations
//! addressed by `inode_indx` rather than returning `Arc<dyn InodeOps>`
//! directly) and without the unsafe raw-pointer downcast the original
//! `link()` used — hard links are simply unsupported here (see
//! DESIGN.md).

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use spin::RwLock;

use crate::vfs::device::Device;
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::fs_ops::{FsMmapParams, FsOps};
use crate::vfs::inode::{Inode, InodeType, S_IFDIR};
use crate::vfs::mount::ROOT_INODE_INDX;
use crate::vfs::types::DirEntry;

enum NodeData {
    File(Vec<u8>),
    Directory(BTreeMap<String, u64>),
}

struct Node {
    mode: AtomicU32,
    uid: AtomicU32,
    gid: AtomicU32,
    links_count: AtomicU32,
    data: RwLock<NodeData>,
}

pub struct RamFs {
    nodes: RwLock<BTreeMap<u64, Arc<Node>>>,
    next_ino: AtomicU64,
}

impl RamFs {
    pub fn new() -> Arc<Self> {
        let fs = Self {
            nodes: RwLock::new(BTreeMap::new()),
            next_ino: AtomicU64::new(ROOT_INODE_INDX + 1),
        };
        // Root is its own parent, same as the original's "root's parent is
        // itself" root-directory setup.
        let mut root_entries = BTreeMap::new();
        root_entries.insert(String::from("."), ROOT_INODE_INDX);
        root_entries.insert(String::from(".."), ROOT_INODE_INDX);
        fs.nodes.write().insert(
            ROOT_INODE_INDX,
            Arc::new(Node {
                mode: AtomicU32::new(S_IFDIR | 0o755),
                uid: AtomicU32::new(0),
                gid: AtomicU32::new(0),
                links_count: AtomicU32::new(2),
                data: RwLock::new(NodeData::Directory(root_entries)),
            }),
        );
        Arc::new(fs)
    }

    fn node(&self, inode_indx: u64) -> VfsResult<Arc<Node>> {
        self.nodes
            .read()
            .get(&inode_indx)
            .cloned()
            .ok_or(VfsError::NotFound)
    }
}

impl FsOps for RamFs {
    fn recognize(&self, device: &Device) -> VfsResult<()> {
        if device.is_virtual {
            Ok(())
        } else {
            Err(VfsError::NotSupported)
        }
    }

    fn read_inode(&self, inode_indx: u64) -> VfsResult<Arc<Inode>> {
        let node = self.node(inode_indx)?;
        let size = match &*node.data.read() {
            NodeData::File(data) => data.len() as u64,
            NodeData::Directory(_) => 0,
        };
        Ok(Arc::new(Inode::new(
            node.mode.load(Ordering::Acquire),
            node.uid.load(Ordering::Acquire),
            node.gid.load(Ordering::Acquire),
            size,
            node.links_count.load(Ordering::Acquire),
        )))
    }

    fn write_inode(&self, inode_indx: u64, inode: &Inode) -> VfsResult<()> {
        let node = self.node(inode_indx)?;
        node.mode.store(inode.mode(), Ordering::Release);
        Ok(())
    }

    fn free_inode(&self, inode_indx: u64) -> VfsResult<()> {
        self.nodes.write().remove(&inode_indx);
        Ok(())
    }

    /// `.` and `..` are ordinary entries in a directory's map, seeded at
    /// creation time (see `create`), so an unmounted `..` traversal is
    /// handled here like any other name rather than needing VFS-level
    /// special-casing.
    fn lookup(&self, parent_ino: u64, name: &str) -> VfsResult<u64> {
        let parent = self.node(parent_ino)?;
        match &*parent.data.read() {
            NodeData::Directory(children) => children.get(name).copied().ok_or(VfsError::NotFound),
            NodeData::File(_) => Err(VfsError::NotDirectory),
        }
    }

    fn create(&self, parent_ino: u64, name: &str, mode: u32) -> VfsResult<u64> {
        let parent = self.node(parent_ino)?;
        {
            let dir = parent.data.read();
            match &*dir {
                NodeData::Directory(children) => {
                    if children.contains_key(name) {
                        return Err(VfsError::AlreadyExists);
                    }
                }
                NodeData::File(_) => return Err(VfsError::NotDirectory),
            }
        }

        let new_ino = self.next_ino.fetch_add(1, Ordering::SeqCst);
        let is_dir = mode & S_IFDIR != 0;
        let node = Arc::new(Node {
            mode: AtomicU32::new(mode),
            uid: AtomicU32::new(0),
            gid: AtomicU32::new(0),
            links_count: AtomicU32::new(1),
            data: RwLock::new(if is_dir {
                let mut entries = BTreeMap::new();
                entries.insert(String::from("."), new_ino);
                entries.insert(String::from(".."), parent_ino);
                NodeData::Directory(entries)
            } else {
                NodeData::File(Vec::new())
            }),
        });

        self.nodes.write().insert(new_ino, node);
        if let NodeData::Directory(children) = &mut *parent.data.write() {
            children.insert(String::from(name), new_ino);
        }
        Ok(new_ino)
    }

    fn unlink(&self, parent_ino: u64, name: &str) -> VfsResult<()> {
        let parent = self.node(parent_ino)?;
        match &mut *parent.data.write() {
            NodeData::Directory(children) => {
                children.remove(name).ok_or(VfsError::NotFound)?;
                Ok(())
            }
            NodeData::File(_) => Err(VfsError::NotDirectory),
        }
    }

    fn mkdir(&self, parent_ino: u64, name: &str, mode: u32) -> VfsResult<u64> {
        self.create(parent_ino, name, mode | S_IFDIR)
    }

    fn rmdir(&self, parent_ino: u64, name: &str) -> VfsResult<()> {
        self.unlink(parent_ino, name)
    }

    fn read(&self, inode_indx: u64, offset: u64, buf: &mut [u8]) -> VfsResult<usize> {
        let node = self.node(inode_indx)?;
        match &*node.data.read() {
            NodeData::File(data) => {
                let offset = offset as usize;
                if offset >= data.len() {
                    return Ok(0);
                }
                let n = core::cmp::min(buf.len(), data.len() - offset);
                buf[..n].copy_from_slice(&data[offset..offset + n]);
                Ok(n)
            }
            NodeData::Directory(_) => Err(VfsError::IsDirectory),
        }
    }

    fn write(&self, inode_indx: u64, offset: u64, buf: &[u8]) -> VfsResult<usize> {
        let node = self.node(inode_indx)?;
        match &mut *node.data.write() {
            NodeData::File(data) => {
                let offset = offset as usize;
                if data.len() < offset + buf.len() {
                    data.resize(offset + buf.len(), 0);
                }
                data[offset..offset + buf.len()].copy_from_slice(buf);
                Ok(buf.len())
            }
            NodeData::Directory(_) => Err(VfsError::IsDirectory),
        }
    }

    fn truncate(&self, inode_indx: u64, size: u64) -> VfsResult<()> {
        let node = self.node(inode_indx)?;
        match &mut *node.data.write() {
            NodeData::File(data) => {
                data.resize(size as usize, 0);
                Ok(())
            }
            NodeData::Directory(_) => Err(VfsError::IsDirectory),
        }
    }

    fn getdents(&self, inode_indx: u64) -> VfsResult<Vec<DirEntry>> {
        let node = self.node(inode_indx)?;
        let children = match &*node.data.read() {
            NodeData::Directory(children) => children.clone(),
            NodeData::File(_) => return Err(VfsError::NotDirectory),
        };

        let nodes = self.nodes.read();
        let mut out = Vec::with_capacity(children.len());
        for (name, ino) in children {
            if let Some(child) = nodes.get(&ino) {
                let inode_type = match &*child.data.read() {
                    NodeData::File(_) => InodeType::File,
                    NodeData::Directory(_) => InodeType::Directory,
                };
                out.push(DirEntry {
                    ino,
                    name,
                    inode_type,
                });
            }
        }
        Ok(out)
    }

    fn can_read(&self, _inode_indx: u64) -> bool {
        true
    }

    fn can_write(&self, _inode_indx: u64) -> bool {
        true
    }

    fn mmap(&self, _inode_indx: u64, _params: &FsMmapParams) -> VfsResult<()> {
        Err(VfsError::NotSupported) // use the VFS's standard private-mapping path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case]
    fn root_is_directory_at_inode_2() {
        let fs = RamFs::new();
        let inode = fs.read_inode(ROOT_INODE_INDX).unwrap();
        assert!(inode.is_dir());
    }

    #[test_case]
    fn create_then_lookup_roundtrips() {
        let fs = RamFs::new();
        let ino = fs.create(ROOT_INODE_INDX, "a.txt", 0o644).unwrap();
        assert_eq!(fs.lookup(ROOT_INODE_INDX, "a.txt").unwrap(), ino);
    }

    #[test_case]
    fn create_duplicate_name_fails() {
        let fs = RamFs::new();
        fs.create(ROOT_INODE_INDX, "a.txt", 0o644).unwrap();
        assert_eq!(
            fs.create(ROOT_INODE_INDX, "a.txt", 0o644).unwrap_err(),
            VfsError::AlreadyExists
        );
    }

    #[test_case]
    fn write_then_read_back() {
        let fs = RamFs::new();
        let ino = fs.create(ROOT_INODE_INDX, "a.txt", 0o644).unwrap();
        fs.write(ino, 0, b"hello").unwrap();
        let mut buf = [0u8; 5];
        let n = fs.read(ino, 0, &mut buf).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf, b"hello");
    }

    #[test_case]
    fn unlink_removes_directory_entry() {
        let fs = RamFs::new();
        fs.create(ROOT_INODE_INDX, "a.txt", 0o644).unwrap();
        fs.unlink(ROOT_INODE_INDX, "a.txt").unwrap();
        assert_eq!(
            fs.lookup(ROOT_INODE_INDX, "a.txt").unwrap_err(),
            VfsError::NotFound
        );
    }

    #[test_case]
    fn getdents_lists_every_child_once() {
        let fs = RamFs::new();
        fs.create(ROOT_INODE_INDX, "a", 0o644).unwrap();
        fs.create(ROOT_INODE_INDX, "b", 0o644).unwrap();
        let mut names: Vec<_> = fs
            .getdents(ROOT_INODE_INDX)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .filter(|n| n != "." && n != "..")
            .collect();
        names.sort();
        assert_eq!(names, alloc::vec![String::from("a"), String::from("b")]);
    }

    #[test_case]
    fn dotdot_entry_resolves_to_parent_inode() {
        let fs = RamFs::new();
        let dir_ino = fs.mkdir(ROOT_INODE_INDX, "sub", 0o755).unwrap();
        assert_eq!(fs.lookup(dir_ino, "..").unwrap(), ROOT_INODE_INDX);
        assert_eq!(fs.lookup(dir_ino, ".").unwrap(), dir_ino);
    }
}
