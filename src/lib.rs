//! Inspect and control a traced process through `ptrace(2)`.
//!
//! Memory, string, and register reads are reconstructed from the kernel's
//! word-at-a-time transfers. Every operation is a blocking, one-shot request
//! against a single tracee, and failures surface as [`Error`] without retry.

#[cfg(not(all(target_os = "linux", any(target_arch = "x86", target_arch = "x86_64"))))]
compile_error!("tracekit only supports Linux on x86 and x86_64");

#[macro_use]
mod macros;

pub mod channel;
pub mod cmd;
pub mod error;
pub mod memory;
pub mod registers;
pub mod stop;
pub mod syscall;
pub mod tracee;

#[cfg(target_arch = "x86")]
mod x86;

#[cfg(target_arch = "x86_64")]
mod x86_64;

pub use channel::{Addr, Request, Word, WORD_SIZE};
pub use cmd::Command;
pub use error::{Error, Result};
pub use registers::{CpuType, Register, Registers};
pub use stop::Stop;
pub use syscall::Syscall;
pub use tracee::{traceme, Tracee};

pub use nix::unistd::Pid;

/// Trace options for [`Tracee::set_options()`], with kernel ABI bit values.
pub use nix::sys::ptrace::Options;

/// Kinds of ptrace-event-stop, with kernel ABI values.
pub use nix::sys::ptrace::Event;

/// POSIX signal.
pub use nix::sys::signal::Signal;
