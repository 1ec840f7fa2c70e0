//! Typed request shapes over the raw `ptrace(2)` syscall.
//!
//! Every request is issued exactly once. Failures are surfaced as
//! [`Error::Request`] carrying the kernel's errno, and are never retried:
//! trace-control requests change the stop/run state of the tracee.

use std::mem::{self, MaybeUninit};
use std::ptr;

use libc::c_void;
use nix::errno::Errno;
use nix::sys::ptrace::RequestType;
use tracing::trace;

use crate::error::{Error, Result};
use crate::Pid;

pub use nix::sys::ptrace::Request;

/// Machine word, the unit of every peek and poke.
pub type Word = libc::c_long;

/// Unsigned view of a machine word.
pub type UWord = libc::c_ulong;

/// Address in the tracee's address space.
pub type Addr = usize;

/// Size of a machine word, in bytes.
pub const WORD_SIZE: usize = mem::size_of::<Word>();

/// Request with no address or data, e.g. `PTRACE_ATTACH`.
pub fn request(request: Request, pid: Pid) -> Result<()> {
    trace!(?request, %pid, "ptrace");

    ptrace_other(request, pid, ptr::null_mut(), ptr::null_mut())?;

    Ok(())
}

/// Request with a data word, e.g. `PTRACE_CONT` with a signal to deliver.
///
/// The meaning of `data` is owned by `request`.
pub fn request_data(request: Request, pid: Pid, data: Word) -> Result<()> {
    trace!(?request, %pid, data, "ptrace");

    ptrace_other(request, pid, ptr::null_mut(), data as *mut c_void)?;

    Ok(())
}

/// Request writing the word `data` at `addr`, e.g. `PTRACE_POKEDATA`.
pub fn request_addr_data(request: Request, pid: Pid, addr: Addr, data: Word) -> Result<()> {
    trace!(?request, %pid, addr, data, "ptrace");

    ptrace_other(request, pid, addr as *mut c_void, data as *mut c_void)?;

    Ok(())
}

/// Request reading the word at `addr`, e.g. `PTRACE_PEEKDATA`.
///
/// A word of `-1` is valid data. Failure is detected from `errno` alone.
pub fn peek(request: Request, pid: Pid, addr: Addr) -> Result<Word> {
    trace!(?request, %pid, addr, "ptrace");

    let ret = unsafe {
        Errno::clear();
        libc::ptrace(
            request as RequestType,
            pid.as_raw(),
            addr as *mut c_void,
            ptr::null_mut::<c_void>(),
        )
    };

    match Errno::result(ret) {
        Ok(..) | Err(Errno::UnknownErrno) => Ok(ret),
        Err(source) => Err(Error::Request { pid, request, source }),
    }
}

/// Request filling a `T` through the data pointer, e.g. `PTRACE_GETREGS`.
///
/// The caller must choose a `T` whose layout matches what the kernel writes
/// for `request`.
pub(crate) fn read_struct<T: Copy>(request: Request, pid: Pid) -> Result<T> {
    trace!(?request, %pid, "ptrace");

    let mut data = MaybeUninit::<T>::uninit();

    ptrace_other(request, pid, ptr::null_mut(), data.as_mut_ptr() as *mut c_void)?;

    // SAFETY: the kernel filled `data` on success.
    Ok(unsafe { data.assume_init() })
}

fn ptrace_other(request: Request, pid: Pid, addr: *mut c_void, data: *mut c_void) -> Result<libc::c_long> {
    let ret = unsafe {
        libc::ptrace(request as RequestType, pid.as_raw(), addr, data)
    };

    Errno::result(ret).map_err(|source| Error::Request { pid, request, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_size_matches_pointer_width() {
        assert_eq!(WORD_SIZE, mem::size_of::<usize>());
    }

    #[test]
    fn test_request_on_missing_pid_fails() {
        // PID 0 is never a tracee of ours.
        let err = request_data(Request::PTRACE_CONT, Pid::from_raw(0), 0).unwrap_err();

        assert!(matches!(err, Error::Request { request: Request::PTRACE_CONT, .. }));
        assert!(err.tracee_died());
    }

    #[test]
    fn test_peek_untraced_fails() {
        let err = peek(Request::PTRACE_PEEKDATA, Pid::from_raw(0), 0).unwrap_err();

        assert!(matches!(err, Error::Request { source: Errno::ESRCH, .. }));
    }
}
