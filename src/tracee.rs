//! Session control of a single tracee.

use std::ffi::OsString;

use nix::sys::wait::{self, WaitPidFlag};
use tracing::debug;

use crate::channel::{self, Addr, Request, Word};
use crate::error::Result;
use crate::memory::{self, PeekWord};
use crate::registers::{Register, Registers};
use crate::stop::Stop;
use crate::{Options, Pid, Signal};

/// Request that the calling process be traced by its parent.
///
/// Intended to be called in a freshly-forked child, before `exec()`.
pub fn traceme() -> Result<()> {
    debug!("requesting trace by parent");

    channel::request(Request::PTRACE_TRACEME, Pid::from_raw(0))
}

/// Handle to a traced process, identified by its PID.
///
/// The handle holds nothing but the PID. Each call is a blocking, one-shot
/// `ptrace(2)` request, and fails if the tracee is gone or not stopped.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tracee {
    pid: Pid,
}

impl Tracee {
    /// Handle for an existing tracee, e.g. a child which called [`traceme()`].
    pub fn new(pid: Pid) -> Self {
        Self { pid }
    }

    /// Attach to a running process. This will deliver a `SIGSTOP`.
    ///
    /// **Warning:** the tracee may not be considered stopped until it has been
    /// seen to stop via [`Tracee::wait()`].
    pub fn attach(pid: Pid) -> Result<Self> {
        debug!(%pid, "attaching");

        channel::request(Request::PTRACE_ATTACH, pid)?;

        Ok(Self::new(pid))
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Detach, undoing [`Tracee::attach()`] or [`traceme()`], and let the tracee run.
    pub fn detach(&self) -> Result<()> {
        debug!(pid = %self.pid, "detaching");

        channel::request(Request::PTRACE_DETACH, self.pid)
    }

    /// Terminate the tracee, as with `PTRACE_KILL`.
    pub fn kill(&self) -> Result<()> {
        debug!(pid = %self.pid, "killing");

        channel::request(Request::PTRACE_KILL, self.pid)
    }

    /// Resume the stopped tracee, delivering `signal` if given.
    pub fn cont(&self, signal: impl Into<Option<Signal>>) -> Result<()> {
        channel::request_data(Request::PTRACE_CONT, self.pid, signal_data(signal))
    }

    /// Resume for a single instruction, delivering `signal` if given.
    pub fn step(&self, signal: impl Into<Option<Signal>>) -> Result<()> {
        channel::request_data(Request::PTRACE_SINGLESTEP, self.pid, signal_data(signal))
    }

    /// Resume until the next syscall entry or exit, delivering `signal` if given.
    pub fn syscall(&self, signal: impl Into<Option<Signal>>) -> Result<()> {
        channel::request_data(Request::PTRACE_SYSCALL, self.pid, signal_data(signal))
    }

    /// Replace the tracing options of the tracee.
    pub fn set_options(&self, options: Options) -> Result<()> {
        debug!(pid = %self.pid, ?options, "setting options");

        channel::request_data(Request::PTRACE_SETOPTIONS, self.pid, options.bits() as Word)
    }

    /// Message of the last ptrace-event-stop, e.g. the new PID of a fork.
    pub fn event_message(&self) -> Result<libc::c_ulong> {
        channel::read_struct(Request::PTRACE_GETEVENTMSG, self.pid)
    }

    /// Number of the syscall the tracee is stopped in, read from its `user` area.
    pub fn syscall_number(&self) -> Result<Word> {
        self.peek_user(Register::syscall_number_offset())
    }

    pub fn registers(&self) -> Result<Registers> {
        Registers::read_from(self.pid)
    }

    pub fn peek_text(&self, addr: Addr) -> Result<Word> {
        channel::peek(Request::PTRACE_PEEKTEXT, self.pid, addr)
    }

    pub fn peek_data(&self, addr: Addr) -> Result<Word> {
        channel::peek(Request::PTRACE_PEEKDATA, self.pid, addr)
    }

    /// Read the word at offset `off` of the virtual `user` struct.
    pub fn peek_user(&self, off: Addr) -> Result<Word> {
        channel::peek(Request::PTRACE_PEEKUSER, self.pid, off)
    }

    pub fn poke_text(&self, addr: Addr, word: Word) -> Result<()> {
        channel::request_addr_data(Request::PTRACE_POKETEXT, self.pid, addr, word)
    }

    pub fn poke_data(&self, addr: Addr, word: Word) -> Result<()> {
        channel::request_addr_data(Request::PTRACE_POKEDATA, self.pid, addr, word)
    }

    /// Write the word at offset `off` of the virtual `user` struct.
    pub fn poke_user(&self, off: Addr, word: Word) -> Result<()> {
        channel::request_addr_data(Request::PTRACE_POKEUSER, self.pid, off, word)
    }

    /// Read exactly `len` bytes of tracee memory at `addr`.
    pub fn read_memory(&self, addr: Addr, len: usize) -> Result<Vec<u8>> {
        memory::read_bytes(self, addr, len)
    }

    /// Read the NUL-terminated string at `addr`.
    pub fn string(&self, addr: Addr) -> Result<OsString> {
        memory::read_cstring(self, addr)
    }

    /// Read the NULL-terminated array of strings at `addr`, such as `argv`.
    pub fn string_vector(&self, addr: Addr) -> Result<Vec<OsString>> {
        memory::read_cstring_vector(self, addr)
    }

    /// Block until the tracee changes state, and decode the stop.
    pub fn wait(&self) -> Result<Stop> {
        let status = wait::waitpid(self.pid, Some(WaitPidFlag::__WALL))?;
        let stop = Stop::decode(self, status)?;

        debug!(pid = %self.pid, ?stop, "tracee stopped");

        Ok(stop)
    }
}

impl PeekWord for Tracee {
    fn peek_word(&self, addr: Addr) -> Result<Word> {
        self.peek_data(addr)
    }
}

fn signal_data(signal: impl Into<Option<Signal>>) -> Word {
    signal.into().map(|s| s as i32 as Word).unwrap_or(0)
}
