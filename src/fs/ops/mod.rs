//! Operations that create, link, copy, move and delete whole filesystem objects.
//!
//! # Destinations
//! Linking, copying and moving share a rule for where the new object ends up. If the destination
//! is an existing directory that can be written to, the object is placed inside it, named after the
//! last component of the source. Otherwise the destination is taken as the exact path of the new
//! object, in which case its parent must be a writable directory and nothing may already exist
//! there.
//!
//! # Atomicity
//! None of these operations are transactional. Recursive copies and deletes stop at the first
//! failure and leave whatever was already done in place. [`move_object`] renames when it can, but
//! falls back to copying and then deleting the source when the destination is on another
//! filesystem; interrupting that leaves both copies behind.

mod tests;

use std::path::{Path, PathBuf};

use libc::{EEXIST, EXDEV, O_CLOEXEC, O_CREAT, O_EXCL, O_RDONLY, O_WRONLY, dev_t, ino_t};
use log::debug;

use crate::fs::dir::{BUFFER_SIZE, Directory};
use crate::fs::file::transfer;
use crate::fs::query::{self, is_writable_directory, lstat};
use crate::fs::util::{self, Fd};
use crate::fs::{Errno, FsError, ObjectKind, Result, path};

type RawResult<T> = std::result::Result<T, Errno>;

/// Applies the destination rule described in the [module docs](self).
pub fn resolve_destination(source: &Path, dest: &Path) -> RawResult<PathBuf> {
    if is_writable_directory(dest) {
        return Ok(dest.join(path::last_component(source)));
    }

    if lstat(dest).is_ok() {
        Err(Errno(EEXIST))?
    }
    let parent = path::parent(dest);
    match query::stat(parent) {
        Err(errno) => Err(errno),
        Ok(attrs) if !attrs.kind.is_directory() => Err(Errno(libc::ENOTDIR)),
        Ok(_) if !is_writable_directory(parent) => Err(Errno(libc::EACCES)),
        Ok(_) => Ok(dest.to_owned()),
    }
}

fn require_source(source: &Path) -> Result<ObjectKind> {
    lstat(source).map(|attrs| attrs.kind).map_err(|_| FsError::SourceMissing {
        path: source.to_owned(),
    })
}

/// Creates a directory at `path`. Missing parent directories are not created.
pub fn create_directory<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if query::exists(path) {
        Err(FsError::AlreadyExists {
            path: path.to_owned(),
        })?
    }

    let fail = |errno| FsError::CreateFailed {
        path: path.to_owned(),
        errno,
    };
    let parent = path::parent(path);
    if !is_writable_directory(parent) {
        let errno = match query::stat(parent) {
            Err(errno) => errno,
            Ok(attrs) if !attrs.kind.is_directory() => Errno(libc::ENOTDIR),
            Ok(_) => Errno(libc::EACCES),
        };
        Err(fail(errno))?
    }

    let pathname = util::c_path(path).map_err(fail)?;
    // SAFETY: pathname is NUL-terminated for the duration of the call.
    match unsafe { libc::mkdir(pathname.as_ptr(), 0o755) } {
        -1 => Err(fail(Errno::last())),
        _ => {
            debug!("created directory {}", path.display());
            Ok(())
        },
    }
}

#[derive(Debug, Clone, Copy)]
enum LinkKind {
    Symbolic,
    Hard,
}

fn link(source: &Path, dest: &Path, kind: LinkKind) -> Result<PathBuf> {
    require_source(source)?;

    let fail = |to: &Path, errno| FsError::LinkFailed {
        from: source.to_owned(),
        to: to.to_owned(),
        errno,
    };
    let target = resolve_destination(source, dest).map_err(|errno| fail(dest, errno))?;
    let from = util::c_path(source).map_err(|errno| fail(&target, errno))?;
    let to = util::c_path(&target).map_err(|errno| fail(&target, errno))?;

    // SAFETY: Both strings are NUL-terminated for the duration of the call.
    let res = unsafe {
        match kind {
            LinkKind::Symbolic => libc::symlink(from.as_ptr(), to.as_ptr()),
            LinkKind::Hard =>     libc::link(from.as_ptr(), to.as_ptr()),
        }
    };
    match res {
        -1 => Err(fail(&target, Errno::last())),
        _ => {
            debug!("created {kind:?} link {} to {}", target.display(), source.display());
            Ok(target)
        },
    }
}

/// Creates a symbolic link to `source`, returning the path of the new link. The link stores
/// `source` exactly as given, so a relative source is resolved relative to the link's directory.
pub fn create_symbolic_link<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<PathBuf> {
    link(source.as_ref(), dest.as_ref(), LinkKind::Symbolic)
}

/// Creates a hard link to `source`, returning the path of the new link.
pub fn create_hard_link<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<PathBuf> {
    link(source.as_ref(), dest.as_ref(), LinkKind::Hard)
}

fn remove(path: &Path, kind: ObjectKind) -> RawResult<()> {
    if kind.is_directory() {
        let names = Directory::open_raw(path)?.names()?;
        for name in names {
            let child = path.join(name);
            let child_kind = lstat(&child)?.kind;
            remove(&child, child_kind)?;
        }
    }

    let pathname = util::c_path(path)?;
    // SAFETY: pathname is NUL-terminated for the duration of the call.
    let res = unsafe {
        if kind.is_directory() {
            libc::rmdir(pathname.as_ptr())
        } else {
            libc::unlink(pathname.as_ptr())
        }
    };
    match res {
        -1 => Err(Errno::last()),
        _ => {
            debug!("deleted {}", path.display());
            Ok(())
        },
    }
}

/// Deletes the object at `path`. Directories are deleted along with everything inside them, with
/// each directory's contents removed before the directory itself. Symbolic links are removed, never
/// followed.
pub fn delete_object<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let kind = require_source(path)?;

    remove(path, kind).map_err(|errno| FsError::DeleteFailed {
        path: path.to_owned(),
        errno,
    })
}

fn copy_file(source: &Path, target: &Path, permissions: u16, scratch: &mut [u8]) -> RawResult<()> {
    let from = Fd::open(&util::c_path(source)?, O_RDONLY | O_CLOEXEC, 0)?;
    let to = Fd::open(
        &util::c_path(target)?,
        O_WRONLY | O_CREAT | O_EXCL | O_CLOEXEC,
        permissions,
    )?;

    let count = transfer(&from, &to, scratch)?;
    debug!("copied {count} bytes from {} to {}", source.display(), target.display());
    to.close()?;
    from.close()
}

fn copy(source: &Path, target: &Path, scratch: &mut [u8]) -> RawResult<()> {
    let attrs = lstat(source)?;

    match attrs.kind {
        ObjectKind::Regular => copy_file(source, target, attrs.permissions, scratch),
        ObjectKind::Directory => {
            let pathname = util::c_path(target)?;
            // Created accessible so the children can be added, the real permissions are set after.
            // SAFETY: pathname is NUL-terminated for the duration of the call.
            if unsafe { libc::mkdir(pathname.as_ptr(), 0o700) } == -1 {
                Err(Errno::last())?
            }
            debug!("created directory {}", target.display());

            let names = Directory::open_raw(source)?.names()?;
            for name in names {
                copy(&source.join(&name), &target.join(&name), scratch)?;
            }

            // SAFETY: pathname is NUL-terminated for the duration of the call.
            match unsafe { libc::chmod(pathname.as_ptr(), attrs.permissions as libc::mode_t) } {
                -1 => Err(Errno::last()),
                _ => Ok(()),
            }
        },
        ObjectKind::SymbolicLink => {
            let link_target = query::read_link(source).map_err(|e| e.errno().unwrap_or(Errno(libc::EIO)))?;
            let from = util::c_path(&link_target)?;
            let to = util::c_path(target)?;
            // SAFETY: Both strings are NUL-terminated for the duration of the call.
            match unsafe { libc::symlink(from.as_ptr(), to.as_ptr()) } {
                -1 => Err(Errno::last()),
                _ => Ok(()),
            }
        },
        // Devices, sockets and FIFOs can't be copied by reading them.
        _ => Err(Errno(libc::ENOTSUP)),
    }
}

/// Whether `dir` is the directory identified by `ancestor` or lies somewhere beneath it. The walk
/// goes up through `..` from `dir` itself, so links and `..` components resolve as the OS sees them.
fn is_within(dir: &Path, ancestor: (dev_t, ino_t)) -> RawResult<bool> {
    let mut current = dir.to_owned();
    let mut id = query::identity(&current)?;
    loop {
        if id == ancestor {
            return Ok(true);
        }
        current.push("..");
        match query::identity(&current)? {
            // Only the root is its own parent.
            parent if parent == id => return Ok(false),
            parent => id = parent,
        }
    }
}

fn copy_resolved(source: &Path, target: &Path) -> Result<()> {
    let fail = |errno| FsError::CopyFailed {
        from: source.to_owned(),
        to: target.to_owned(),
        errno,
    };

    // A directory copied into itself would keep finding its own copy.
    if lstat(source).map_err(fail)?.kind.is_directory() {
        let source_id = query::identity(source).map_err(fail)?;
        if is_within(path::parent(target), source_id).map_err(fail)? {
            Err(fail(Errno(libc::EINVAL)))?
        }
    }

    let mut scratch = vec![0; BUFFER_SIZE];
    copy(source, target, &mut scratch).map_err(fail)
}

/// Copies the object at `source`, returning the path of the copy. Directories are copied along with
/// everything inside them, each directory being created before its contents. Symbolic links are
/// recreated pointing at the same target.
pub fn copy_object<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<PathBuf> {
    let (source, dest) = (source.as_ref(), dest.as_ref());
    require_source(source)?;

    let target = resolve_destination(source, dest).map_err(|errno| FsError::CopyFailed {
        from: source.to_owned(),
        to: dest.to_owned(),
        errno,
    })?;
    copy_resolved(source, &target)?;
    Ok(target)
}

/// Moves the object at `source`, returning its new path. Within a filesystem this is an atomic
/// rename; across filesystems it's a copy followed by deleting the source.
pub fn move_object<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<PathBuf> {
    let (source, dest) = (source.as_ref(), dest.as_ref());
    require_source(source)?;

    let fail = |to: &Path, errno| FsError::MoveFailed {
        from: source.to_owned(),
        to: to.to_owned(),
        errno,
    };
    let target = resolve_destination(source, dest).map_err(|errno| fail(dest, errno))?;
    let from = util::c_path(source).map_err(|errno| fail(&target, errno))?;
    let to = util::c_path(&target).map_err(|errno| fail(&target, errno))?;

    // SAFETY: Both strings are NUL-terminated for the duration of the call.
    if unsafe { libc::rename(from.as_ptr(), to.as_ptr()) } == 0 {
        debug!("renamed {} to {}", source.display(), target.display());
        return Ok(target);
    }
    match Errno::last() {
        Errno(EXDEV) => {
            debug!("moving {} across filesystems by copying", source.display());
            copy_resolved(source, &target)?;
            delete_object(source)?;
            Ok(target)
        },
        errno => Err(fail(&target, errno)),
    }
}
