#![allow(dead_code)]

use anyhow::{bail, Result};
use nix::unistd::{fork, ForkResult};
use tracekit::{Signal, Stop, Tracee};

/// Fork a copy of the test process which stops itself as our tracee.
///
/// The tracee shares our address space layout, so the address of any of our
/// statics or live heap values is valid to read in the tracee.
pub fn fork_tracee() -> Result<Tracee> {
    match unsafe { fork() }? {
        ForkResult::Child => {
            // Only async-signal-safe calls from here.
            unsafe {
                let null = std::ptr::null_mut::<libc::c_void>();

                if libc::ptrace(libc::PTRACE_TRACEME, 0, null, null) != 0 {
                    libc::_exit(1);
                }
                libc::raise(libc::SIGSTOP);
                libc::_exit(0)
            }
        },
        ForkResult::Parent { child } => {
            let tracee = Tracee::new(child);

            expect_stop(&tracee, Stop::SignalDelivery { signal: Signal::SIGSTOP })?;

            Ok(tracee)
        },
    }
}

/// Kill a stopped tracee and reap it.
pub fn kill_tracee(tracee: &Tracee) -> Result<()> {
    tracee.kill()?;

    expect_stop(tracee, Stop::Killed { signal: Signal::SIGKILL, core_dumped: false })
}

pub fn expect_stop(tracee: &Tracee, expected: Stop) -> Result<()> {
    let stop = tracee.wait()?;

    if stop != expected {
        bail!("expected {:?}, saw {:?}", expected, stop);
    }

    Ok(())
}

pub fn addr_of<T: ?Sized>(value: &T) -> tracekit::Addr {
    value as *const T as *const u8 as tracekit::Addr
}
