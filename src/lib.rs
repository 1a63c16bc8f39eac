//! An object-oriented veneer over POSIX filesystem primitives, written directly against `libc`.
//!
//! # Layout
//! Everything lives under [`fs`]. The core of the crate is [`FileRegistry`](fs::FileRegistry), a
//! table of open file descriptors that all descriptor-based reads, writes and truncations go
//! through. Around it sit stateless path-based helpers: attribute and permission queries, directory
//! listing, and link, copy, move and delete operations that recurse into directories.
//!
//! # Error Handling
//! Every fallible operation returns a [`FsError`](fs::FsError), a single enum with a variant per
//! failed operation that carries the path or descriptor involved and, where the OS reported one, the
//! raw [`Errno`](fs::Errno). Nothing is retried and nothing is logged in place of being returned,
//! with two exceptions: path-based file operations swallow (and log) a failure to close their
//! temporary descriptor, and the `Option`-returning convenience queries treat any failure as `None`.
//!
//! Errors that can only mean the crate's own bookkeeping is broken, like the OS rejecting a
//! descriptor the registry still owns, panic instead.
//!
//! # Logging
//! Opens, closes and recursive steps are logged at `debug` through the [`log`] facade, individual
//! chunk transfers at `trace`. The crate never installs a logger itself.
//!
//! # Dependencies
//! The [`fs`] module relies on `libc` for its thin syscall wrappers, and only builds on Linux because
//! it reads directories with `getdents64`. It also depends on `derive_more` to remove the need for
//! some very repetitive error boilerplate.
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod fs;

pub(crate) mod util;
