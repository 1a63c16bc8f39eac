use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use libc::{c_int, c_void};

use crate::fs::Errno;

pub fn err_no() -> c_int {
    // SAFETY: raw_os_error guarantees Some if constructed from last_os_error.
    unsafe { io::Error::last_os_error().raw_os_error().unwrap_unchecked() }
}

/// Reads raw `linux_dirent64` records for the directory open at `fd` into `dirp`.
///
/// # Safety
/// `dirp` must be valid for writes of `bytes` bytes.
pub unsafe fn getdents(fd: c_int, dirp: *mut c_void, bytes: usize) -> isize {
    // SAFETY: The caller upholds the buffer requirements, fd validity is checked by the kernel.
    unsafe { libc::syscall(libc::SYS_getdents64, fd, dirp, bytes) as isize }
}

/// Converts a path into the NUL-terminated form expected by libc. Paths containing an interior NUL
/// can't be represented and are rejected with `EINVAL`.
pub fn c_path(path: &Path) -> Result<CString, Errno> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| Errno(libc::EINVAL))
}
