//! VFS error type.
//!
//! Mirrors the classic POSIX errno set named in the syscall surface. Every
//! public VFS operation returns `VfsResult<T>`; there is no panic-based
//! unwinding in the success/failure path, only explicit propagation.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VfsError {
    /// EFAULT - null/empty path or bad user pointer
    Fault,
    /// EPERM / EACCES - permission engine refusal
    PermissionDenied,
    /// EISDIR
    IsDirectory,
    /// ENOTDIR
    NotDirectory,
    /// ENOENT
    NotFound,
    /// EEXIST
    AlreadyExists,
    /// EBUSY
    Busy,
    /// EBADF
    BadFileDescriptor,
    /// ENOTSOCK
    NotSocket,
    /// ENOEXEC - also doubles as the fs_ops "use the VFS default" sentinel
    NotSupported,
    /// EAGAIN
    Again,
    /// EOVERFLOW
    Overflow,
    /// EINVAL
    InvalidArgument,
    /// EIO
    IoError,
    /// ENOSPC
    NoSpace,
    /// EMFILE
    TooManyFiles,
    /// EINVAL on seek specifically
    InvalidSeek,
    /// ENAMETOOLONG
    NameTooLong,
    /// EXDEV
    CrossDevice,
    /// EROFS
    ReadOnly,
}

pub type VfsResult<T> = Result<T, VfsError>;

impl VfsError {
    /// Negative errno value, as the original kernel's public surface returns it.
    pub const fn errno(self) -> i32 {
        match self {
            VfsError::Fault => -14,
            VfsError::PermissionDenied => -1,
            VfsError::IsDirectory => -21,
            VfsError::NotDirectory => -20,
            VfsError::NotFound => -2,
            VfsError::AlreadyExists => -17,
            VfsError::Busy => -16,
            VfsError::BadFileDescriptor => -9,
            VfsError::NotSocket => -88,
            VfsError::NotSupported => -8,
            VfsError::Again => -11,
            VfsError::Overflow => -75,
            VfsError::InvalidArgument => -22,
            VfsError::IoError => -5,
            VfsError::NoSpace => -28,
            VfsError::TooManyFiles => -24,
            VfsError::InvalidSeek => -22,
            VfsError::NameTooLong => -36,
            VfsError::CrossDevice => -18,
            VfsError::ReadOnly => -30,
        }
    }
}

impl fmt::Display for VfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VfsError::Fault => "EFAULT",
            VfsError::PermissionDenied => "EPERM",
            VfsError::IsDirectory => "EISDIR",
            VfsError::NotDirectory => "ENOTDIR",
            VfsError::NotFound => "ENOENT",
            VfsError::AlreadyExists => "EEXIST",
            VfsError::Busy => "EBUSY",
            VfsError::BadFileDescriptor => "EBADF",
            VfsError::NotSocket => "ENOTSOCK",
            VfsError::NotSupported => "ENOEXEC",
            VfsError::Again => "EAGAIN",
            VfsError::Overflow => "EOVERFLOW",
            VfsError::InvalidArgument => "EINVAL",
            VfsError::IoError => "EIO",
            VfsError::NoSpace => "ENOSPC",
            VfsError::TooManyFiles => "EMFILE",
            VfsError::InvalidSeek => "EINVAL",
            VfsError::NameTooLong => "ENAMETOOLONG",
            VfsError::CrossDevice => "EXDEV",
            VfsError::ReadOnly => "EROFS",
        };
        write!(f, "{}", name)
    }
}
