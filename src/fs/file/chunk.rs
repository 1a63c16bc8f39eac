use log::trace;

use crate::fs::Errno;
use crate::fs::util::Fd;

/// Appends everything from the current position of `fd` to the end of the file onto `out`.
pub(crate) fn read_to_end(fd: &Fd, scratch: &mut [u8], out: &mut Vec<u8>) -> Result<(), Errno> {
    loop {
        match fd.read(scratch)? {
            0 => return Ok(()),
            count => {
                trace!("read chunk of {count} bytes from fd {}", fd.raw());
                out.extend_from_slice(&scratch[..count]);
            },
        }
    }
}

/// Appends up to `remaining` bytes from the current position of `fd` onto `out`, stopping early
/// if the end of the file is reached.
pub(crate) fn read_up_to(
    fd: &Fd,
    scratch: &mut [u8],
    mut remaining: u64,
    out: &mut Vec<u8>,
) -> Result<(), Errno> {
    while remaining > 0 {
        let want = scratch.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        match fd.read(&mut scratch[..want])? {
            0 => break,
            count => {
                trace!("read chunk of {count} bytes from fd {}", fd.raw());
                out.extend_from_slice(&scratch[..count]);
                remaining -= count as u64;
            },
        }
    }
    Ok(())
}

/// Writes all of `content` at the current position of `fd`, at most `chunk_size` bytes per call.
pub(crate) fn write_all(fd: &Fd, content: &[u8], chunk_size: usize) -> Result<u64, Errno> {
    let mut written = 0_u64;
    for chunk in content.chunks(chunk_size.max(1)) {
        let mut rem = chunk;
        while !rem.is_empty() {
            match fd.write(rem)? {
                // The OS accepted nothing without reporting why.
                0 => Err(Errno(libc::EIO))?,
                count => {
                    trace!("wrote chunk of {count} bytes to fd {}", fd.raw());
                    rem = &rem[count..];
                    written += count as u64;
                },
            }
        }
    }
    Ok(written)
}

/// Writes `buf` like [`write_all`], removing bytes from the front of `buf` once the OS has accepted
/// them. On failure `buf` holds exactly what wasn't written.
pub(crate) fn drain(fd: &Fd, buf: &mut Vec<u8>, chunk_size: usize) -> Result<u64, Errno> {
    let mut written = 0;
    let res = loop {
        if written == buf.len() {
            break Ok(());
        }
        let end = buf.len().min(written + chunk_size.max(1));
        match fd.write(&buf[written..end]) {
            Ok(0) => break Err(Errno(libc::EIO)),
            Ok(count) => {
                trace!("wrote chunk of {count} bytes to fd {}", fd.raw());
                written += count;
            },
            Err(errno) => break Err(errno),
        }
    };
    buf.drain(..written);
    res.map(|()| written as u64)
}

/// Copies everything remaining in `from` onto the current position of `to`.
pub(crate) fn transfer(from: &Fd, to: &Fd, scratch: &mut [u8]) -> Result<u64, Errno> {
    let mut written = 0_u64;
    loop {
        match from.read(scratch)? {
            0 => return Ok(written),
            count => written += write_all(to, &scratch[..count], count)?,
        }
    }
}
