use std::collections::TryReserveError;
use std::ffi::NulError;

use nix::errno::Errno;

use crate::channel::{Addr, Request};
use crate::registers::Register;
use crate::Pid;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("ptrace request {request:?} failed for tracee = {pid}")]
    Request {
        pid: Pid,
        request: Request,
        source: Errno,
    },

    #[error("No such register: {name:?}")]
    NoSuchRegister { name: String },

    #[error("No such system call: {name:?}")]
    NoSuchSyscall { name: String },

    #[error("Value {value} is not representable in register {register}")]
    RegisterValue { register: Register, value: String },

    #[error("Not enough memory for {len} bytes read from tracee")]
    OutOfMemory { len: usize, source: TryReserveError },

    #[error("Word scan from {addr:#x} overflows the address space")]
    AddressOverflow { addr: Addr },

    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("Argument contains an interior NUL byte")]
    Nul(#[from] NulError),

    #[error("OS error")]
    OS(#[from] nix::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Platform error code reported by the kernel, if this error carries one.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Error::Request { source, .. } => Some(*source),
            Error::OS(errno) => Some(*errno),
            _ => None,
        }
    }

    /// True if the tracee no longer exists, or is not stopped for us.
    pub fn tracee_died(&self) -> bool {
        self.errno() == Some(Errno::ESRCH)
    }
}
