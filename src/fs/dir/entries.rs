use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

use log::trace;

use super::Directory;
use crate::fs::util;
use crate::fs::{Errno, ObjectKind};

// Layout of struct linux_dirent64.
const INO_OFFSET: usize = 0;
const RECLEN_OFFSET: usize = 16;
const TYPE_OFFSET: usize = 18;
const NAME_OFFSET: usize = 19;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub inode: u64,
    /// The kind reported alongside the entry, if the filesystem provides one.
    pub kind: Option<ObjectKind>,
    pub name: OsString,
}

impl DirEntry {
    pub fn is_dot(&self) -> bool {
        self.name.as_bytes() == b"." || self.name.as_bytes() == b".."
    }
}

pub struct DirEntries<'a> {
    pub(crate) dir: &'a Directory,
    pub(crate) buf: Box<[u8]>,
    pub(crate) head: usize,
    pub(crate) len: usize,
    pub(crate) done: bool,
}

impl DirEntries<'_> {
    fn fill(&mut self) -> Result<(), Errno> {
        // SAFETY: buf is valid for writes of its whole length.
        let count = unsafe {
            util::getdents(self.dir.fd.raw(), self.buf.as_mut_ptr().cast(), self.buf.len())
        };
        if count == -1 {
            Err(Errno::last())?
        }

        trace!("read {count} bytes of entries from descriptor {}", self.dir.fd.raw());
        self.head = 0;
        self.len = count as usize;
        self.done = count == 0;
        Ok(())
    }

    fn parse(&self, head: usize) -> (DirEntry, usize) {
        let record = &self.buf[head..self.len];

        let mut ino = [0; 8];
        ino.copy_from_slice(&record[INO_OFFSET..INO_OFFSET + 8]);
        let mut reclen = [0; 2];
        reclen.copy_from_slice(&record[RECLEN_OFFSET..RECLEN_OFFSET + 2]);
        let reclen = u16::from_ne_bytes(reclen) as usize;

        let name = &record[NAME_OFFSET..reclen];
        let name = match name.iter().position(|ch| *ch == b'\0') {
            Some(end) => &name[..end],
            None => name,
        };

        (
            DirEntry {
                inode: u64::from_ne_bytes(ino),
                kind: ObjectKind::from_dirent_type(record[TYPE_OFFSET]),
                name: OsStr::from_bytes(name).to_owned(),
            },
            reclen,
        )
    }
}

impl Iterator for DirEntries<'_> {
    type Item = Result<DirEntry, Errno>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            None?
        }
        if self.head >= self.len {
            if let Err(e) = self.fill() {
                self.done = true;
                return Some(Err(e));
            }
            if self.done {
                None?
            }
        }

        let (entry, reclen) = self.parse(self.head);
        self.head += reclen;
        Some(Ok(entry))
    }
}
