//! Pure helpers for taking paths apart. Apart from [`absolute`], nothing in this module touches the
//! filesystem; everything operates on the bytes of the path as given.


use std::env;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

use crate::fs::{Errno, FsError, Result};

fn trim_trailing_slashes(bytes: &[u8]) -> &[u8] {
    let mut end = bytes.len();
    while end > 1 && bytes[end - 1] == b'/' {
        end -= 1;
    }
    &bytes[..end]
}

/// Returns the final segment of `path`, ignoring any trailing slashes. The root is its own last
/// component.
pub fn last_component<P: AsRef<Path> + ?Sized>(path: &P) -> &OsStr {
    let bytes = trim_trailing_slashes(path.as_ref().as_os_str().as_bytes());

    match bytes.iter().rposition(|ch| *ch == b'/') {
        Some(_) if bytes == b"/" => OsStr::from_bytes(bytes),
        Some(index) => OsStr::from_bytes(&bytes[index + 1..]),
        None => OsStr::from_bytes(bytes),
    }
}

/// Returns everything before the final segment of `path`. A bare name has the parent `"."`, while
/// the root is its own parent.
pub fn parent<P: AsRef<Path> + ?Sized>(path: &P) -> &Path {
    let bytes = trim_trailing_slashes(path.as_ref().as_os_str().as_bytes());

    let parent = match bytes.iter().rposition(|ch| *ch == b'/') {
        None => b".".as_slice(),
        Some(0) => b"/".as_slice(),
        Some(index) => trim_trailing_slashes(&bytes[..index]),
    };
    Path::new(OsStr::from_bytes(parent))
}

/// Returns `path` in a form that can be joined to directly: with exactly one trailing slash.
pub fn directory_form<P: AsRef<Path> + ?Sized>(path: &P) -> OsString {
    let bytes = path.as_ref().as_os_str().as_bytes();
    if bytes.is_empty() {
        return OsString::from("./");
    }

    let mut form = trim_trailing_slashes(bytes).to_vec();
    if form != b"/" {
        form.push(b'/');
    }
    OsString::from_vec(form)
}

/// Resolves a relative `path` against the process's current working directory. Absolute paths are
/// returned unchanged.
pub fn absolute<P: AsRef<Path> + ?Sized>(path: &P) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let cwd = env::current_dir().map_err(|e| FsError::CurrentDirFailed {
        errno: Errno(e.raw_os_error().unwrap_or(libc::EIO)),
    })?;
    Ok(cwd.join(path))
}
