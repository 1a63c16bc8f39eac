use std::ffi::OsString;
use std::path::{Path, PathBuf};

use libc::{O_CLOEXEC, O_DIRECTORY, O_RDONLY, c_int};

use super::DirEntries;
use crate::fs::util::{self, Fd};
use crate::fs::{Attributes, Errno, FsError, Result};

pub(crate) const BUFFER_SIZE: usize = 8192;

/// An open directory.
#[derive(Debug)]
pub struct Directory {
    pub(crate) fd: Fd,
    pub(crate) path: PathBuf,
}

impl Directory {
    pub fn open<P: AsRef<Path>>(dir_path: P) -> Result<Directory> {
        let dir_path = dir_path.as_ref();
        Directory::open_raw(dir_path).map_err(|errno| FsError::DirectoryListingFailed {
            path: dir_path.to_owned(),
            errno,
        })
    }

    pub(crate) fn open_raw(dir_path: &Path) -> std::result::Result<Directory, Errno> {
        let pathname = util::c_path(dir_path)?;

        // Can't open as O_PATH because we need to read entries.
        let flags: c_int = O_RDONLY | O_DIRECTORY | O_CLOEXEC;

        Ok(Directory {
            fd: Fd::open(&pathname, flags, 0)?,
            path: dir_path.to_owned(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> DirEntries<'_> {
        DirEntries {
            dir: self,
            buf: vec![0; BUFFER_SIZE].into_boxed_slice(),
            head: 0,
            len: 0,
            done: false,
        }
    }

    /// Collects the names of every entry, excluding `.` and `..`.
    pub(crate) fn names(&self) -> std::result::Result<Vec<OsString>, Errno> {
        let mut names = Vec::new();
        for entry in self.entries() {
            let entry = entry?;
            if !entry.is_dot() {
                names.push(entry.name);
            }
        }
        Ok(names)
    }

    pub fn attributes(&self) -> Result<Attributes> {
        self.fd.metadata().map_err(|errno| FsError::AttributesFailed {
            path: self.path.clone(),
            errno,
        })
    }
}

/// Lists the names of the entries in the directory at `path`, excluding `.` and `..`, sorted
/// bytewise.
pub fn contents_of_directory<P: AsRef<Path>>(path: P) -> Result<Vec<OsString>> {
    let path = path.as_ref();
    let fail = |errno| FsError::DirectoryListingFailed {
        path: path.to_owned(),
        errno,
    };

    let dir = Directory::open_raw(path).map_err(fail)?;
    let mut names = dir.names().map_err(fail)?;
    names.sort();
    Ok(names)
}
