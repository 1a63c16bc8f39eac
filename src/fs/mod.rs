//! A thin veneer over the Linux filesystem syscalls.
//!
//! - [`file`] holds the core: the [`FileRegistry`] of open descriptors, and [`AppendStream`].
//! - [`query`] answers questions about objects by path, without following symbolic links.
//! - [`dir`] reads directory contents.
//! - [`ops`] creates, links, copies, moves and deletes objects.
//! - [`path`] takes path strings apart.
//!
//! Everything is synchronous and blocking, and nothing takes locks on the files involved.
#![cfg(target_os = "linux")]

pub mod dir;
pub mod file;
pub mod ops;
pub mod path;
pub mod query;

mod error;
mod metadata;
mod object_kind;
mod panic;
mod util;

pub use dir::{Directory, contents_of_directory};
pub use error::*;
pub use file::{AppendStream, Descriptor, FileRegistry, OpenMode, RegistryConfig};
pub use metadata::*;
pub use object_kind::*;
pub use ops::{copy_object, create_directory, create_hard_link, create_symbolic_link, delete_object, move_object};
pub use query::{attributes, exists, is_deletable, is_executable, is_readable, is_writable, kind};
