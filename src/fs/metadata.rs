use std::time::{Duration, SystemTime, UNIX_EPOCH};

use libc::stat as Stat;

use super::ObjectKind;

/// The mask applied to `st_mode` to produce [`Attributes::permissions`]: permission bits plus
/// setuid, setgid and sticky.
pub const PERMISSION_MASK: u32 = 0o7777;

/// A point in time as reported by `stat`, in seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub secs: i64,
    pub nanos: i64,
}

impl Timestamp {
    pub fn to_system_time(self) -> SystemTime {
        let nanos = Duration::from_nanos(self.nanos.clamp(0, 999_999_999) as u64);
        if self.secs >= 0 {
            UNIX_EPOCH + Duration::from_secs(self.secs as u64) + nanos
        } else {
            UNIX_EPOCH - Duration::from_secs(self.secs.unsigned_abs()) + nanos
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(value: Timestamp) -> Self {
        value.to_system_time()
    }
}

/// A snapshot of an object's attributes. Every query produces a new one, nothing is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub kind: ObjectKind,          // st_mode
    pub size: u64,                 // st_size
    pub time_accessed: Timestamp,  // st_atime, st_atime_nsec
    pub time_modified: Timestamp,  // st_mtime, st_mtime_nsec
    pub permissions: u16,          // st_mode & 0o7777
}

impl Attributes {
    #[allow(clippy::unnecessary_cast)]
    pub(crate) const fn from_stat(raw: &Stat) -> Attributes {
        Attributes {
            kind: ObjectKind::from_stat_mode(raw.st_mode),
            size: if raw.st_size < 0 { 0 } else { raw.st_size as u64 },
            time_accessed: Timestamp {
                secs: raw.st_atime as i64,
                nanos: raw.st_atime_nsec as i64,
            },
            time_modified: Timestamp {
                secs: raw.st_mtime as i64,
                nanos: raw.st_mtime_nsec as i64,
            },
            permissions: (raw.st_mode & PERMISSION_MASK) as u16,
        }
    }
}
