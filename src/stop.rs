//! Decoding of `wait(2)` statuses into tracee stops.

use std::convert::TryFrom;

use nix::sys::wait::WaitStatus;

use crate::error::Result;
use crate::tracee::Tracee;
use crate::{Pid, Signal};

/// State change of a tracee, as reported by `wait(2)`.
///
/// Event stops carry data obtained via `PTRACE_GETEVENTMSG`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stop {
    // Terminal: the tracee is gone.
    Exited { exit_code: i32 },
    Killed { signal: Signal, core_dumped: bool },

    // signal-delivery-stop
    SignalDelivery { signal: Signal },

    // syscall-stop, reported as such with `PTRACE_O_TRACESYSGOOD`
    Syscall,

    // ptrace-event-stops
    Fork { new: Pid },
    Vfork { new: Pid },
    Clone { new: Pid },
    Exec { old: Pid },
    VforkDone { new: Pid },
    Exiting { exit_code: i32 },
    Signaling { signal: Signal, core_dumped: bool },
    Seccomp { data: u16 },
}

impl Stop {
    /// True if the tracee no longer exists.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stop::Exited { .. } | Stop::Killed { .. })
    }

    pub(crate) fn decode(tracee: &Tracee, status: WaitStatus) -> Result<Self> {
        let stop = match status {
            WaitStatus::Exited(_, exit_code) =>
                Stop::Exited { exit_code },
            WaitStatus::Signaled(_, signal, core_dumped) =>
                Stop::Killed { signal, core_dumped },
            WaitStatus::Stopped(_, signal) =>
                Stop::SignalDelivery { signal },
            WaitStatus::PtraceSyscall(_) =>
                Stop::Syscall,
            WaitStatus::PtraceEvent(_, _, event) => {
                let msg = tracee.event_message()?;

                match event {
                    libc::PTRACE_EVENT_FORK =>
                        Stop::Fork { new: msg_pid(msg) },
                    libc::PTRACE_EVENT_VFORK =>
                        Stop::Vfork { new: msg_pid(msg) },
                    libc::PTRACE_EVENT_CLONE =>
                        Stop::Clone { new: msg_pid(msg) },
                    libc::PTRACE_EVENT_EXEC =>
                        Stop::Exec { old: msg_pid(msg) },
                    libc::PTRACE_EVENT_VFORK_DONE =>
                        Stop::VforkDone { new: msg_pid(msg) },
                    libc::PTRACE_EVENT_EXIT => {
                        // The message is the pending wait status. Only the low 16 bits are defined.
                        match ExitType::parse(msg as u16)? {
                            ExitType::Exit(exit_code) =>
                                Stop::Exiting { exit_code },
                            ExitType::Signaled(signal, core_dumped) =>
                                Stop::Signaling { signal, core_dumped },
                        }
                    },
                    libc::PTRACE_EVENT_SECCOMP =>
                        // `SECCOMP_RET_DATA`, the low 16 bits of an int.
                        Stop::Seccomp { data: msg as u16 },
                    _ =>
                        internal_error!("unexpected ptrace-event-stop code"),
                }
            },
            // Assume `!WNOHANG`, `!WCONTINUED`.
            WaitStatus::Continued(_) |
            WaitStatus::StillAlive =>
                internal_error!("unreachable `wait()` status"),
        };

        Ok(stop)
    }
}

fn msg_pid(msg: libc::c_ulong) -> Pid {
    Pid::from_raw(msg as u32 as i32)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ExitType {
    Exit(i32),
    Signaled(Signal, bool),
}

impl ExitType {
    fn parse(status: u16) -> Result<Self> {
        // The bit layout of the word `status` is:
        //
        //   15                         8   7                     0
        //    +-------------------------+---+---------------------+
        //    |        exit_code        | c |       sig_no        |
        //    +-------------------------+---+---------------------+
        //
        // A nonzero `sig_no` means termination by that signal, with `c` set on
        // core dump. Otherwise it is a normal exit.
        let sig_no = status & 0x7f;

        let ty = if sig_no == 0 {
            ExitType::Exit(i32::from((status >> 8) as u8))
        } else {
            let signal = Signal::try_from(i32::from(sig_no))?;
            let core_dumped = status & (1 << 7) != 0;

            ExitType::Signaled(signal, core_dumped)
        };

        Ok(ty)
    }
}
