use derive_more::IsVariant;

/// The type of a filesystem object, as reported by the OS. FIFOs and anything else outside of this
/// set are reported as [`Unknown`](ObjectKind::Unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IsVariant)]
pub enum ObjectKind {
    Regular,
    Directory,
    SymbolicLink,
    CharacterSpecial,
    BlockSpecial,
    Socket,
    Unknown,
}

use ObjectKind::*;

impl ObjectKind {
    #[inline(always)]
    pub(crate) const fn from_stat_mode(st_mode: u32) -> ObjectKind {
        match st_mode & libc::S_IFMT {
            libc::S_IFREG =>  Regular,
            libc::S_IFDIR =>  Directory,
            libc::S_IFLNK =>  SymbolicLink,
            libc::S_IFCHR =>  CharacterSpecial,
            libc::S_IFBLK =>  BlockSpecial,
            libc::S_IFSOCK => Socket,
            _ =>              Unknown,
        }
    }

    pub(crate) const fn from_dirent_type(d_type: u8) -> Option<ObjectKind> {
        Some(match d_type {
            libc::DT_REG =>     Regular,
            libc::DT_DIR =>     Directory,
            libc::DT_LNK =>     SymbolicLink,
            libc::DT_CHR =>     CharacterSpecial,
            libc::DT_BLK =>     BlockSpecial,
            libc::DT_SOCK =>    Socket,
            libc::DT_UNKNOWN => return None,
            _ =>                Unknown,
        })
    }
}
