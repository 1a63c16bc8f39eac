use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

use derive_more::{Display, Error, IsVariant};
use libc::c_int;

use crate::fs::Descriptor;
use crate::fs::util;

pub type Result<T> = std::result::Result<T, FsError>;

/// A raw OS error number, captured directly after a failed syscall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Errno(pub c_int);

impl Errno {
    /// Captures `errno` for the calling thread.
    pub fn last() -> Errno {
        Errno(util::err_no())
    }

    pub const fn raw(self) -> c_int {
        self.0
    }
}

impl Display for Errno {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", io::Error::from_raw_os_error(self.0))
    }
}

impl From<Errno> for io::Error {
    fn from(value: Errno) -> Self {
        io::Error::from_raw_os_error(value.0)
    }
}

/// Every failure this crate can report. Variants carry the path(s) or descriptor involved and, when
/// an OS call failed, the [`Errno`] it reported.
#[derive(Debug, Display, Error, IsVariant)]
pub enum FsError {
    #[display("failed to open {}: {errno}", path.display())]
    OpenFailed { path: PathBuf, errno: Errno },

    #[display("descriptor {descriptor} is not open in this registry")]
    NotOpen { descriptor: Descriptor },

    #[display("{} does not exist", path.display())]
    SourceMissing { path: PathBuf },

    #[display("{} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[display("failed to link {} to {}: {errno}", to.display(), from.display())]
    LinkFailed { from: PathBuf, to: PathBuf, errno: Errno },

    #[display("failed to delete {}: {errno}", path.display())]
    DeleteFailed { path: PathBuf, errno: Errno },

    #[display("failed to move {} to {}: {errno}", from.display(), to.display())]
    MoveFailed { from: PathBuf, to: PathBuf, errno: Errno },

    #[display("failed to copy {} to {}: {errno}", from.display(), to.display())]
    CopyFailed { from: PathBuf, to: PathBuf, errno: Errno },

    #[display("failed to create {}: {errno}", path.display())]
    CreateFailed { path: PathBuf, errno: Errno },

    #[display("failed to list {}: {errno}", path.display())]
    DirectoryListingFailed { path: PathBuf, errno: Errno },

    #[display("failed to read attributes of {}: {errno}", path.display())]
    AttributesFailed { path: PathBuf, errno: Errno },

    #[display("failed to set permissions of {}: {errno}", path.display())]
    SetPermissionsFailed { path: PathBuf, errno: Errno },

    #[display("failed to read link {}: {errno}", path.display())]
    ReadLinkFailed { path: PathBuf, errno: Errno },

    #[display("failed to close descriptor {descriptor}: {errno}")]
    CloseFailed { descriptor: Descriptor, errno: Errno },

    #[display("failed to reposition descriptor {descriptor}: {errno}")]
    SeekFailed { descriptor: Descriptor, errno: Errno },

    #[display("failed to read from descriptor {descriptor}: {errno}")]
    ReadFailed { descriptor: Descriptor, errno: Errno },

    #[display("failed to write to descriptor {descriptor}: {errno}")]
    WriteFailed { descriptor: Descriptor, errno: Errno },

    #[display("failed to truncate descriptor {descriptor}: {errno}")]
    TruncateFailed { descriptor: Descriptor, errno: Errno },

    #[display("failed to sync descriptor {descriptor}: {errno}")]
    SyncFailed { descriptor: Descriptor, errno: Errno },

    #[display("invalid range {start}..{end}")]
    InvalidRange { start: u64, end: u64 },

    #[display("append stream for {} failed: {errno}", path.display())]
    StreamFailed { path: PathBuf, errno: Errno },

    #[display("append stream for {} is closed", path.display())]
    StreamClosed { path: PathBuf },

    #[display("failed to determine the current directory: {errno}")]
    CurrentDirFailed { errno: Errno },
}

impl FsError {
    /// The OS error behind this failure, if one was reported.
    pub const fn errno(&self) -> Option<Errno> {
        use FsError::*;

        match self {
            OpenFailed { errno, .. }
            | LinkFailed { errno, .. }
            | DeleteFailed { errno, .. }
            | MoveFailed { errno, .. }
            | CopyFailed { errno, .. }
            | CreateFailed { errno, .. }
            | DirectoryListingFailed { errno, .. }
            | AttributesFailed { errno, .. }
            | SetPermissionsFailed { errno, .. }
            | ReadLinkFailed { errno, .. }
            | CloseFailed { errno, .. }
            | SeekFailed { errno, .. }
            | ReadFailed { errno, .. }
            | WriteFailed { errno, .. }
            | TruncateFailed { errno, .. }
            | SyncFailed { errno, .. }
            | StreamFailed { errno, .. }
            | CurrentDirFailed { errno } => Some(*errno),
            NotOpen { .. }
            | SourceMissing { .. }
            | AlreadyExists { .. }
            | InvalidRange { .. }
            | StreamClosed { .. } => None,
        }
    }
}
