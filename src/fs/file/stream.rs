use std::path::{Path, PathBuf};

use libc::{O_APPEND, O_CLOEXEC, O_CREAT, O_WRONLY};
use log::{debug, warn};

use super::{DEFAULT_CHUNK_SIZE, DEFAULT_CREATE_MODE, chunk};
use crate::fs::util::{self, Fd};
use crate::fs::{Errno, FsError, Result};

/// A buffered writer that only ever appends to the end of a single file, creating it if needed.
///
/// Writes are collected in a fixed-capacity buffer and handed to the OS when it fills, on
/// [`flush`](AppendStream::flush), [`synchronize`](AppendStream::synchronize) or
/// [`close`](AppendStream::close). The file is opened with `O_APPEND`, so every write lands at the
/// end of the file as it is at that moment, even if something else has written to it since.
#[derive(Debug)]
pub struct AppendStream {
    path: PathBuf,
    fd: Option<Fd>,
    buf: Vec<u8>,
    capacity: usize,
}

impl AppendStream {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<AppendStream> {
        AppendStream::with_capacity(path, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_capacity<P: AsRef<Path>>(path: P, capacity: usize) -> Result<AppendStream> {
        let path = path.as_ref();
        let fail = |errno| FsError::OpenFailed {
            path: path.to_owned(),
            errno,
        };

        let pathname = util::c_path(path).map_err(fail)?;
        let flags = O_WRONLY | O_APPEND | O_CREAT | O_CLOEXEC;
        let fd = Fd::open(&pathname, flags, DEFAULT_CREATE_MODE).map_err(fail)?;

        debug!("opened append stream for {}", path.display());
        let capacity = capacity.max(1);
        Ok(AppendStream {
            path: path.to_owned(),
            fd: Some(fd),
            buf: Vec::with_capacity(capacity),
            capacity,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn fd(&self) -> Result<&Fd> {
        self.fd.as_ref().ok_or_else(|| FsError::StreamClosed {
            path: self.path.clone(),
        })
    }

    fn fail(&self, errno: Errno) -> FsError {
        FsError::StreamFailed {
            path: self.path.clone(),
            errno,
        }
    }

    /// Appends `content`, returning the number of bytes accepted. Content at least as large as the
    /// buffer bypasses it.
    pub fn write(&mut self, content: &[u8]) -> Result<u64> {
        self.fd()?;
        if self.buf.len() + content.len() > self.capacity {
            self.flush()?;
        }

        if content.len() >= self.capacity {
            let fd = self.fd()?;
            chunk::write_all(fd, content, self.capacity).map_err(|errno| self.fail(errno))
        } else {
            self.buf.extend_from_slice(content);
            Ok(content.len() as u64)
        }
    }

    /// Hands everything buffered to the OS. If that fails, whatever wasn't written stays buffered
    /// for the next flush.
    pub fn flush(&mut self) -> Result<()> {
        let res = match &self.fd {
            Some(fd) => chunk::drain(fd, &mut self.buf, self.capacity),
            None => {
                return Err(FsError::StreamClosed {
                    path: self.path.clone(),
                });
            },
        };
        res.map(|_| ()).map_err(|errno| self.fail(errno))
    }

    /// Flushes, then forces the written data to storage.
    pub fn synchronize(&mut self) -> Result<()> {
        self.flush()?;
        self.fd()?.sync().map_err(|errno| self.fail(errno))
    }

    /// Flushes and closes the stream. Closing an already closed stream does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.fd.is_none() {
            return Ok(());
        }

        let flushed = self.flush();
        let closed = match self.fd.take() {
            Some(fd) => fd.close().map_err(|errno| self.fail(errno)),
            None => Ok(()),
        };
        debug!("closed append stream for {}", self.path.display());
        flushed.and(closed)
    }
}

impl Drop for AppendStream {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("error while dropping append stream: {e}");
        }
    }
}
