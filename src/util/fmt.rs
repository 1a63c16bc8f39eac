use std::fmt::{self, Debug, Formatter};

/// Formats permission bits the way they're usually written, e.g. `0o644`.
pub struct OctalMode(pub u16);

impl Debug for OctalMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0o{:o}", self.0)
    }
}
