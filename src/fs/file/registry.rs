use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::{self, Display, Formatter};
use std::mem;
use std::path::{Path, PathBuf};

use libc::c_int;
use log::{debug, warn};

use super::{OpenMode, RegistryConfig, chunk};
use crate::fs::panic::{BadFdPanic, Panic};
use crate::fs::util::{self, Fd, Whence};
use crate::fs::{Attributes, FsError, Result};

/// A descriptor opened through a [`FileRegistry`]. It is only meaningful to the registry that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Descriptor(pub(crate) c_int);

impl Descriptor {
    /// The OS value of this descriptor.
    pub const fn raw(self) -> c_int {
        self.0
    }
}

impl Display for Descriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub(crate) struct OpenEntry {
    pub fd: Fd,
    pub path: PathBuf,
    pub mode: OpenMode,
}

/// A table of open file descriptors, through which all descriptor-based I/O is performed.
///
/// Descriptors enter the table when opened and leave it when closed. Every operation that takes a
/// [`Descriptor`] fails with [`FsError::NotOpen`] if the descriptor isn't currently in the table,
/// including descriptors that were closed or that came from another registry. Dropping the registry
/// closes whatever is still open.
///
/// The OS reuses descriptor numbers, so once a descriptor is closed, a later open may hand out the
/// same value again.
#[derive(Debug, Default)]
pub struct FileRegistry {
    config: RegistryConfig,
    open: HashMap<Descriptor, OpenEntry>,
}

impl FileRegistry {
    pub fn new() -> FileRegistry {
        FileRegistry::with_config(RegistryConfig::new())
    }

    pub fn with_config(config: RegistryConfig) -> FileRegistry {
        FileRegistry {
            config,
            open: HashMap::new(),
        }
    }

    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn open<P: AsRef<Path>>(&mut self, path: P, mode: OpenMode) -> Result<Descriptor> {
        let path = path.as_ref();
        let fail = |errno| FsError::OpenFailed {
            path: path.to_owned(),
            errno,
        };

        let pathname = util::c_path(path).map_err(fail)?;
        let fd = Fd::open(&pathname, mode.flags(), self.config.create_mode).map_err(fail)?;
        let descriptor = fd.raw();

        debug!("opened {} for {mode:?} as descriptor {descriptor}", path.display());
        Ok(self.insert(fd, path, mode))
    }

    pub(crate) fn insert(&mut self, fd: Fd, path: &Path, mode: OpenMode) -> Descriptor {
        let descriptor = Descriptor(fd.raw());
        match self.open.entry(descriptor) {
            // The OS just handed this value out, so the stale entry must have been closed behind
            // the registry's back. Its number now belongs to `fd`, so it mustn't be closed again.
            Entry::Occupied(slot) => {
                mem::forget(slot.remove().fd);
                BadFdPanic.panic()
            },
            Entry::Vacant(slot) => {
                slot.insert(OpenEntry {
                    fd,
                    path: path.to_owned(),
                    mode,
                });
            },
        }
        descriptor
    }

    pub fn open_for_reading<P: AsRef<Path>>(&mut self, path: P) -> Result<Descriptor> {
        self.open(path, OpenMode::Reading)
    }

    pub fn open_for_updating<P: AsRef<Path>>(&mut self, path: P) -> Result<Descriptor> {
        self.open(path, OpenMode::Updating)
    }

    pub fn open_for_writing<P: AsRef<Path>>(&mut self, path: P) -> Result<Descriptor> {
        self.open(path, OpenMode::Writing)
    }

    /// Removes `descriptor` from the registry and closes it. The descriptor is removed even if the
    /// OS reports an error while closing it.
    pub fn close(&mut self, descriptor: Descriptor) -> Result<()> {
        let entry = self.open.remove(&descriptor).ok_or(FsError::NotOpen { descriptor })?;

        debug!("closing descriptor {descriptor} for {}", entry.path.display());
        entry.fd.close().map_err(|errno| FsError::CloseFailed {
            descriptor,
            errno,
        })
    }

    pub fn is_open(&self, descriptor: Descriptor) -> bool {
        self.open.contains_key(&descriptor)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Every descriptor currently open in this registry, in no particular order.
    pub fn descriptors(&self) -> impl Iterator<Item = Descriptor> + '_ {
        self.open.keys().copied()
    }

    /// The path `descriptor` was opened with.
    pub fn path_of(&self, descriptor: Descriptor) -> Option<&Path> {
        self.open.get(&descriptor).map(|entry| entry.path.as_path())
    }

    pub fn mode_of(&self, descriptor: Descriptor) -> Option<OpenMode> {
        self.open.get(&descriptor).map(|entry| entry.mode)
    }

    fn fd(&self, descriptor: Descriptor) -> Result<&Fd> {
        self.open
            .get(&descriptor)
            .map(|entry| &entry.fd)
            .ok_or(FsError::NotOpen { descriptor })
    }

    fn seek(fd: &Fd, descriptor: Descriptor, offset: u64, whence: Whence) -> Result<u64> {
        fd.seek(offset, whence).map_err(|errno| FsError::SeekFailed {
            descriptor,
            errno,
        })
    }

    fn scratch(&self) -> Vec<u8> {
        vec![0; self.config.chunk_size]
    }

    /// Reads the whole file from the beginning, regardless of the descriptor's current position.
    pub fn read_whole(&self, descriptor: Descriptor) -> Result<Vec<u8>> {
        let fd = self.fd(descriptor)?;
        Self::seek(fd, descriptor, 0, Whence::Start)?;

        let mut scratch = self.scratch();
        let mut content = Vec::new();
        chunk::read_to_end(fd, &mut scratch, &mut content).map_err(|errno| FsError::ReadFailed {
            descriptor,
            errno,
        })?;
        Ok(content)
    }

    /// Reads the bytes in `start..end`. If the file ends before `end`, only the bytes up to the end
    /// of the file are returned.
    pub fn read_range(&self, descriptor: Descriptor, start: u64, end: u64) -> Result<Vec<u8>> {
        let fd = self.fd(descriptor)?;
        if end < start {
            Err(FsError::InvalidRange { start, end })?
        }
        Self::seek(fd, descriptor, start, Whence::Start)?;

        let mut scratch = self.scratch();
        let mut content = Vec::new();
        chunk::read_up_to(fd, &mut scratch, end - start, &mut content).map_err(|errno| {
            FsError::ReadFailed {
                descriptor,
                errno,
            }
        })?;
        Ok(content)
    }

    fn write_from(&self, descriptor: Descriptor, offset: u64, whence: Whence, content: &[u8]) -> Result<u64> {
        let fd = self.fd(descriptor)?;
        Self::seek(fd, descriptor, offset, whence)?;

        chunk::write_all(fd, content, self.config.chunk_size).map_err(|errno| FsError::WriteFailed {
            descriptor,
            errno,
        })
    }

    /// Overwrites the bytes starting at `offset` with `content`, returning the number of bytes
    /// written. Writing past the end of the file extends it.
    pub fn write_at(&self, descriptor: Descriptor, offset: u64, content: &[u8]) -> Result<u64> {
        self.write_from(descriptor, offset, Whence::Start, content)
    }

    /// Appends `content` to the current end of the file, returning the number of bytes written.
    pub fn write_to_end(&self, descriptor: Descriptor, content: &[u8]) -> Result<u64> {
        self.write_from(descriptor, 0, Whence::End, content)
    }

    /// Sets the length of the file to `len`, zero-filling if it grows, and moves the descriptor's
    /// position to `len`.
    pub fn truncate(&self, descriptor: Descriptor, len: u64) -> Result<()> {
        let fd = self.fd(descriptor)?;
        fd.truncate(len).map_err(|errno| FsError::TruncateFailed {
            descriptor,
            errno,
        })?;
        Self::seek(fd, descriptor, len, Whence::Start)?;
        Ok(())
    }

    /// Forces everything written through `descriptor` to storage.
    pub fn sync(&self, descriptor: Descriptor) -> Result<()> {
        self.fd(descriptor)?.sync().map_err(|errno| FsError::SyncFailed {
            descriptor,
            errno,
        })
    }

    pub fn attributes(&self, descriptor: Descriptor) -> Result<Attributes> {
        let entry = self.open.get(&descriptor).ok_or(FsError::NotOpen { descriptor })?;
        entry.fd.metadata().map_err(|errno| FsError::AttributesFailed {
            path: entry.path.clone(),
            errno,
        })
    }

    /// Opens `path`, runs `op` on the new descriptor and then closes it, whatever the outcome of
    /// `op`. A failure to close is logged, not returned.
    fn with_open<T, P, F>(&mut self, path: P, mode: OpenMode, op: F) -> Result<T>
    where
        P: AsRef<Path>,
        F: FnOnce(&Self, Descriptor) -> Result<T>,
    {
        let descriptor = self.open(path, mode)?;
        let res = op(self, descriptor);

        if let Err(e) = self.close(descriptor) {
            warn!("ignoring failure while closing after path operation: {e}");
        }
        res
    }

    pub fn read_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<u8>> {
        self.with_open(path, OpenMode::Reading, |registry, descriptor| {
            registry.read_whole(descriptor)
        })
    }

    pub fn read_file_range<P: AsRef<Path>>(&mut self, path: P, start: u64, end: u64) -> Result<Vec<u8>> {
        self.with_open(path, OpenMode::Reading, |registry, descriptor| {
            registry.read_range(descriptor, start, end)
        })
    }

    pub fn write_file_at<P: AsRef<Path>>(&mut self, path: P, offset: u64, content: &[u8]) -> Result<u64> {
        self.with_open(path, OpenMode::Updating, |registry, descriptor| {
            registry.write_at(descriptor, offset, content)
        })
    }

    pub fn append_to_file<P: AsRef<Path>>(&mut self, path: P, content: &[u8]) -> Result<u64> {
        self.with_open(path, OpenMode::Updating, |registry, descriptor| {
            registry.write_to_end(descriptor, content)
        })
    }

    pub fn truncate_file<P: AsRef<Path>>(&mut self, path: P, len: u64) -> Result<()> {
        self.with_open(path, OpenMode::Updating, |registry, descriptor| {
            registry.truncate(descriptor, len)
        })
    }
}

impl Drop for FileRegistry {
    fn drop(&mut self) {
        for (descriptor, entry) in self.open.drain() {
            debug!("force closing descriptor {descriptor} for {}", entry.path.display());
            if let Err(errno) = entry.fd.close() {
                warn!("error while force closing descriptor {descriptor}: {errno}");
            }
        }
    }
}
