use std::fmt::{self, Debug, Formatter};

use crate::util::fmt::OctalMode;

pub const DEFAULT_CHUNK_SIZE: usize = 8192;
pub const DEFAULT_CREATE_MODE: u16 = 0o644;

/// Settings for a [`FileRegistry`](super::FileRegistry), built up from logical defaults.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub(crate) chunk_size: usize,
    pub(crate) create_mode: u16,
}

impl RegistryConfig {
    pub const fn new() -> RegistryConfig {
        RegistryConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            create_mode: DEFAULT_CREATE_MODE,
        }
    }

    /// Sets the most bytes moved by a single read or write. Values below 1 are raised to 1.
    pub const fn chunk_size(mut self, value: usize) -> RegistryConfig {
        self.chunk_size = if value == 0 { 1 } else { value };
        self
    }

    /// Sets the permission bits given to files created by an open call, before the umask applies.
    pub const fn create_mode(mut self, value: u16) -> RegistryConfig {
        self.create_mode = value & 0o7777;
        self
    }

    pub const fn get_chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub const fn get_create_mode(&self) -> u16 {
        self.create_mode
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig::new()
    }
}

impl Debug for RegistryConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("chunk_size", &self.chunk_size)
            .field("create_mode", &OctalMode(self.create_mode))
            .finish()
    }
}
