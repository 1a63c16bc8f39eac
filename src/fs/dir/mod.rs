//! Types for reading the contents of directories, primarily [`Directory`] and the [`DirEntries`]
//! iterator it produces.
//!
//! Entries are read in batches with `getdents64`, so a [`DirEntries`] iterator only holds a single
//! fixed-size buffer regardless of how large the directory is. The order entries are produced in is
//! whatever the filesystem reports; [`contents_of_directory`] sorts them.

mod directory;
mod entries;

pub use directory::*;
pub use entries::*;
