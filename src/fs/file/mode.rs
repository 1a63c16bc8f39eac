use libc::{O_CLOEXEC, O_CREAT, O_RDONLY, O_RDWR, O_WRONLY, c_int};

/// The access a [`FileRegistry`](super::FileRegistry) descriptor was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Read-only. The file must already exist.
    Reading,
    /// Read-write, creating the file if it's missing.
    Updating,
    /// Write-only, creating the file if it's missing.
    Writing,
}

impl OpenMode {
    pub(crate) const fn flags(self) -> c_int {
        O_CLOEXEC | match self {
            OpenMode::Reading =>  O_RDONLY,
            OpenMode::Updating => O_RDWR | O_CREAT,
            OpenMode::Writing =>  O_WRONLY | O_CREAT,
        }
    }
}
