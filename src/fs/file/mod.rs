//! File I/O, split between two independent types:
//!
//! - [`FileRegistry`], which owns a table of open descriptors and gates every read, write and
//!   truncation behind a check that the descriptor is still open in that table.
//! - [`AppendStream`], a buffered writer that only ever appends to a single file.
//!
//! # Chunked Transfer
//! All reads and writes move data in chunks of a fixed size (8 KiB by default, see
//! [`RegistryConfig`]), looping until the request is satisfied. Short reads and writes reported by
//! the OS are continued with the remainder as part of the same operation. A zero-length read always
//! ends a read, so requesting bytes past the end of a file returns whatever was available.
//!
//! # Path Variants
//! Each descriptor operation has a path-based counterpart that opens the path, performs the
//! operation and closes it again, even if the operation failed.

mod chunk;
mod config;
mod mode;
mod registry;
mod stream;

pub use config::*;
pub use mode::*;
pub use registry::*;
pub use stream::*;

pub(crate) use chunk::*;
