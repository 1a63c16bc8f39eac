//! Path-based questions about filesystem objects. None of these follow symbolic links: a query on a
//! link describes the link itself.


use std::ffi::OsString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStringExt;
use std::path::{Path, PathBuf};

use libc::{AT_FDCWD, AT_SYMLINK_NOFOLLOW, EFAULT, R_OK, W_OK, X_OK, c_int, dev_t, ino_t, stat as Stat};

use crate::fs::panic::{BadStackAddrPanic, Panic};
use crate::fs::util;
use crate::fs::{Attributes, Errno, FsError, ObjectKind, Result, Timestamp, path};

pub(crate) fn lstat(path: &Path) -> std::result::Result<Attributes, Errno> {
    stat_with(path, true)
}

pub(crate) fn stat(path: &Path) -> std::result::Result<Attributes, Errno> {
    stat_with(path, false)
}

/// The device and inode of the object at `path`, following symbolic links.
pub(crate) fn identity(path: &Path) -> std::result::Result<(dev_t, ino_t), Errno> {
    let raw = raw_stat(path, false)?;
    Ok((raw.st_dev, raw.st_ino))
}

fn stat_with(path: &Path, no_follow: bool) -> std::result::Result<Attributes, Errno> {
    raw_stat(path, no_follow).map(|raw| Attributes::from_stat(&raw))
}

fn raw_stat(path: &Path, no_follow: bool) -> std::result::Result<Stat, Errno> {
    let pathname = util::c_path(path)?;

    let mut raw_meta: MaybeUninit<Stat> = MaybeUninit::uninit();
    // SAFETY: pathname is NUL-terminated and raw_meta is valid for writes of a whole stat struct.
    let res = unsafe {
        if no_follow {
            libc::lstat(pathname.as_ptr(), raw_meta.as_mut_ptr())
        } else {
            libc::stat(pathname.as_ptr(), raw_meta.as_mut_ptr())
        }
    };
    if res == -1 {
        match util::err_no() {
            EFAULT => BadStackAddrPanic.panic(),
            e =>      Err(Errno(e))?,
        }
    }
    // SAFETY: stat either initializes raw_meta or returns an error and we've returned.
    Ok(unsafe { raw_meta.assume_init() })
}

fn accessible(path: &Path, mode: c_int, flags: c_int) -> bool {
    let Ok(pathname) = util::c_path(path) else {
        return false;
    };

    // SAFETY: pathname is NUL-terminated for the duration of the call.
    unsafe { libc::faccessat(AT_FDCWD, pathname.as_ptr(), mode, flags) == 0 }
}

/// Whether anything, including a dangling symbolic link, occupies `path`.
pub fn exists<P: AsRef<Path>>(path: P) -> bool {
    lstat(path.as_ref()).is_ok()
}

pub fn attributes<P: AsRef<Path>>(path: P) -> Result<Attributes> {
    let path = path.as_ref();
    lstat(path).map_err(|errno| FsError::AttributesFailed {
        path: path.to_owned(),
        errno,
    })
}

pub fn kind<P: AsRef<Path>>(path: P) -> Option<ObjectKind> {
    lstat(path.as_ref()).ok().map(|attrs| attrs.kind)
}

pub fn size<P: AsRef<Path>>(path: P) -> Option<u64> {
    lstat(path.as_ref()).ok().map(|attrs| attrs.size)
}

pub fn permissions<P: AsRef<Path>>(path: P) -> Option<u16> {
    lstat(path.as_ref()).ok().map(|attrs| attrs.permissions)
}

pub fn modified<P: AsRef<Path>>(path: P) -> Option<Timestamp> {
    lstat(path.as_ref()).ok().map(|attrs| attrs.time_modified)
}

pub fn accessed<P: AsRef<Path>>(path: P) -> Option<Timestamp> {
    lstat(path.as_ref()).ok().map(|attrs| attrs.time_accessed)
}

pub fn is_readable<P: AsRef<Path>>(path: P) -> bool {
    accessible(path.as_ref(), R_OK, AT_SYMLINK_NOFOLLOW)
}

pub fn is_writable<P: AsRef<Path>>(path: P) -> bool {
    accessible(path.as_ref(), W_OK, AT_SYMLINK_NOFOLLOW)
}

pub fn is_executable<P: AsRef<Path>>(path: P) -> bool {
    accessible(path.as_ref(), X_OK, AT_SYMLINK_NOFOLLOW)
}

/// Whether the object at `path` could be removed: it must exist and its parent directory must be
/// writable and searchable.
pub fn is_deletable<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    exists(path) && accessible(path::parent(path), W_OK | X_OK, 0)
}

/// Whether `path` resolves, following links, to a directory the caller can create entries in.
pub(crate) fn is_writable_directory(path: &Path) -> bool {
    matches!(stat(path), Ok(attrs) if attrs.kind.is_directory()) && accessible(path, W_OK | X_OK, 0)
}

/// Sets the permission bits of the object at `path`. Only the low 12 bits of `bits` are used.
pub fn set_permissions<P: AsRef<Path>>(path: P, bits: u16) -> Result<()> {
    let path = path.as_ref();
    let fail = |errno| FsError::SetPermissionsFailed {
        path: path.to_owned(),
        errno,
    };
    let pathname = util::c_path(path).map_err(fail)?;

    // SAFETY: pathname is NUL-terminated for the duration of the call.
    match unsafe { libc::chmod(pathname.as_ptr(), (bits & 0o7777) as libc::mode_t) } {
        -1 => Err(fail(Errno::last())),
        _ => Ok(()),
    }
}

/// Returns the target stored in the symbolic link at `path`, exactly as it was written.
pub fn read_link<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let fail = |errno| FsError::ReadLinkFailed {
        path: path.to_owned(),
        errno,
    };
    let pathname = util::c_path(path).map_err(fail)?;

    let mut buf: Vec<u8> = Vec::with_capacity(libc::PATH_MAX as usize);
    loop {
        // SAFETY: buf has spare capacity for buf.capacity() bytes, which readlink never exceeds.
        let count = unsafe {
            libc::readlink(pathname.as_ptr(), buf.as_mut_ptr().cast(), buf.capacity())
        };
        if count == -1 {
            return Err(fail(Errno::last()));
        }

        let count = count as usize;
        // A full buffer may mean the target was truncated.
        if count < buf.capacity() {
            // SAFETY: readlink initialized the first count bytes.
            unsafe { buf.set_len(count) };
            return Ok(PathBuf::from(OsString::from_vec(buf)));
        }
        buf.reserve(buf.capacity() * 2);
    }
}
