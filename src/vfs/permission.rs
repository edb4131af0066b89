//! C7 — permission engine.
//!
//! Classic owner/group/other rwx resolution with super-user bypass.

use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::inode::Inode;

#[derive(Debug, Clone, Copy)]
pub struct Credentials {
    pub uid: u32,
    pub gid: u32,
    pub is_super_user: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    Execute,
}

impl Access {
    fn bits(self) -> (u32, u32, u32) {
        match self {
            Access::Read => (0o400, 0o040, 0o004),
            Access::Write => (0o200, 0o020, 0o002),
            Access::Execute => (0o100, 0o010, 0o001),
        }
    }
}

/// `creds == None` models an in-kernel caller with no associated thread,
/// which is always allowed, same as the super-user bypass.
///
/// Note the deliberate asymmetry carried over from the original: the
/// "other" branch requires *both* uid and gid to differ from the inode's
/// owner/group. A user who shares the inode's group but whose group rwx
/// bit happens to be cleared does not fall through to the other
/// permission bits; it is denied. See DESIGN.md for the decision to keep
/// this rather than "fix" it to conventional POSIX fallthrough.
pub fn check_access(inode: &Inode, creds: Option<&Credentials>, access: Access) -> VfsResult<()> {
    let creds = match creds {
        None => return Ok(()),
        Some(c) => c,
    };
    if creds.is_super_user {
        return Ok(());
    }

    let mode = inode.mode();
    let (owner_bit, group_bit, other_bit) = access.bits();
    let owner_matches = creds.uid == inode.uid();
    let group_matches = creds.gid == inode.gid();

    if owner_matches && mode & owner_bit != 0 {
        return Ok(());
    }
    if group_matches && mode & group_bit != 0 {
        return Ok(());
    }
    if !owner_matches && !group_matches && mode & other_bit != 0 {
        return Ok(());
    }

    Err(VfsError::PermissionDenied)
}
