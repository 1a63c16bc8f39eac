use std::ffi::CStr;
use std::fmt::{self, Debug, Formatter};
use std::mem::{self, MaybeUninit};
use std::thread;

use libc::{EBADF, EFAULT, EINTR, c_int, off_t, stat as Stat};
use log::warn;

use crate::fs::panic::{BadFdPanic, BadStackAddrPanic, Panic};
use crate::fs::util;
use crate::fs::{Attributes, Errno};

/// An owned OS file descriptor. The descriptor is closed when this value is dropped, unless it has
/// already been consumed by [`Fd::close`].
pub(crate) struct Fd(pub c_int);

pub(crate) enum Whence {
    Start,
    End,
}

impl Fd {
    pub fn open(pathname: &CStr, flags: c_int, mode: u16) -> Result<Fd, Errno> {
        // SAFETY: pathname is a valid NUL-terminated string for the duration of the call.
        match unsafe { libc::open(pathname.as_ptr(), flags, mode as c_int) } {
            -1 => Err(Errno::last()),
            fd => Ok(Fd(fd)),
        }
    }

    pub const fn raw(&self) -> c_int {
        self.0
    }

    pub fn metadata(&self) -> Result<Attributes, Errno> {
        let mut raw_meta: MaybeUninit<Stat> = MaybeUninit::uninit();
        // SAFETY: raw_meta is valid for writes of a whole stat struct.
        if unsafe { libc::fstat(self.0, raw_meta.as_mut_ptr()) } == -1 {
            match util::err_no() {
                EBADF =>  BadFdPanic.panic(),
                EFAULT => BadStackAddrPanic.panic(),
                e =>      Err(Errno(e))?,
            }
        }
        // SAFETY: fstat either initializes raw_meta or returns an error and we've returned.
        let raw = unsafe { raw_meta.assume_init() };

        Ok(Attributes::from_stat(&raw))
    }

    pub fn seek(&self, offset: u64, whence: Whence) -> Result<u64, Errno> {
        let offset = off_t::try_from(offset).map_err(|_| Errno(libc::EOVERFLOW))?;
        let whence = match whence {
            Whence::Start => libc::SEEK_SET,
            Whence::End =>   libc::SEEK_END,
        };

        // SAFETY: lseek has no memory safety requirements.
        match unsafe { libc::lseek(self.0, offset, whence) } {
            -1 => Err(Errno::last()),
            pos => Ok(pos as u64),
        }
    }

    pub fn read(&self, buf: &mut [u8]) -> Result<usize, Errno> {
        // SAFETY: buf is valid for writes of buf.len() bytes.
        match unsafe { libc::read(self.0, buf.as_mut_ptr().cast(), buf.len()) } {
            -1 => Err(Errno::last()),
            count => Ok(count as usize),
        }
    }

    pub fn write(&self, buf: &[u8]) -> Result<usize, Errno> {
        // SAFETY: buf is valid for reads of buf.len() bytes.
        match unsafe { libc::write(self.0, buf.as_ptr().cast(), buf.len()) } {
            -1 => Err(Errno::last()),
            count => Ok(count as usize),
        }
    }

    pub fn truncate(&self, len: u64) -> Result<(), Errno> {
        let len = off_t::try_from(len).map_err(|_| Errno(libc::EFBIG))?;

        // SAFETY: ftruncate has no memory safety requirements.
        match unsafe { libc::ftruncate(self.0, len) } {
            -1 => Err(Errno::last()),
            _ => Ok(()),
        }
    }

    pub fn sync(&self) -> Result<(), Errno> {
        // SAFETY: There is no memory management here and any returned errors are handled.
        match unsafe { libc::fsync(self.0) } {
            -1 => Err(Errno::last()),
            _ => Ok(()),
        }
    }

    pub fn close(self) -> Result<(), Errno> {
        let fd = self.0;
        // The descriptor is released below regardless of the outcome, so Drop mustn't close it a
        // second time.
        mem::forget(self);

        // SAFETY: close invalidates the provided file descriptor regardless of the outcome, and
        // this method took ownership of it.
        if unsafe { libc::close(fd) } == -1 {
            match util::err_no() {
                // Panic only if we aren't already, to prevent aborting an existing unwind.
                EBADF if !thread::panicking() => BadFdPanic.panic(),
                e => Err(Errno(e))?,
            }
        }
        Ok(())
    }
}

impl Drop for Fd {
    fn drop(&mut self) {
        // SAFETY: After this, the file descriptor is invalidated but we are dropping self so it
        // doesn't matter.
        if unsafe { libc::close(self.0) } == -1 {
            match util::err_no() {
                // Interrupted closes still release the descriptor on Linux.
                EINTR => (),
                e => warn!("error while dropping file descriptor {}: {}", self.0, Errno(e)),
            }
        }
    }
}

impl Debug for Fd {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Fd({})", self.0)
    }
}
