mod fd;
mod syscall;

pub(crate) use fd::*;
pub(crate) use syscall::*;
