use std::ffi::CString;

use nix::{
    sys::{ptrace, signal::{raise, Signal}},
    unistd::{fork, ForkResult, Pid},
};
use tracing::debug;

use crate::error::{Error, Result};


const DEV_NULL: &[u8] = b"/dev/null\0";

/// Exit code of a child that could not become a tracee or `exec()`.
pub const SPAWN_FAILED: i32 = 255;

/// Command to spawn as a child process to be traced.
#[derive(Clone, Debug)]
pub struct Command {
    /// Argument vector to pass to `execv()`. The first element is the program path.
    argv: Vec<CString>,

    /// Request `PTRACE_TRACEME` and raise `SIGSTOP` after forking, pre-exec.
    ///
    /// Defaults to `true`.
    trace_me: bool,

    /// Redirect stdout and stderr of the child to `/dev/null`.
    ///
    /// Defaults to `false`.
    quiet: bool,
}

impl Command {
    /// Fails if `argv` is empty, or if any argument contains a NUL byte.
    pub fn new<S: Into<Vec<u8>>>(argv: impl IntoIterator<Item = S>) -> Result<Self> {
        // Own NUL-terminated strings for the foreign exec call.
        //
        // We're heap-allocating, so always do this before forking.
        let argv: std::result::Result<Vec<_>, _> = argv
            .into_iter()
            .map(CString::new)
            .collect();
        let argv = argv?;

        if argv.is_empty() {
            return Err(Error::InvalidCommand { reason: "program path required".into() });
        }

        Ok(Self { argv, trace_me: true, quiet: false })
    }

    /// Set the value of the `trace_me` flag.
    pub fn trace_me(mut self, trace_me: bool) -> Self {
        self.trace_me = trace_me;
        self
    }

    /// Set the value of the `quiet` flag.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Fork and exec a child process determined by `self.argv`.
    ///
    /// If `self.trace_me`, the child sets itself as a tracee of the parent, then
    /// raises `SIGSTOP` so the parent can observe it pre-exec without a race. The
    /// caller must `wait()` for that stop, then resume the child.
    pub fn fork_exec(&self) -> Result<Pid> {
        // Heap-allocates, must occur pre-fork.
        let argv = self.argv();

        // SAFETY: the child only makes async-signal-safe calls before `exec()`.
        match unsafe { fork() }? {
            ForkResult::Child => {
                // No post-fork call may allocate, so failure exits directly.
                unsafe {
                    if self.quiet && !silence_output() {
                        libc::_exit(SPAWN_FAILED);
                    }

                    if self.trace_me {
                        if ptrace::traceme().is_err() {
                            libc::_exit(SPAWN_FAILED);
                        }

                        if raise(Signal::SIGSTOP).is_err() {
                            libc::_exit(SPAWN_FAILED);
                        }
                    }

                    libc::execv(argv[0], argv.as_ptr());
                    libc::_exit(SPAWN_FAILED)
                }
            },
            ForkResult::Parent { child } => {
                debug!(pid = %child, argv = ?self.argv, "spawned tracee");

                Ok(child)
            },
        }
    }

    // Construct NUL-terminated arguments for `execv`. We heap-allocate to return a `Vec`,
    // and so must do this before calling `fork()`.
    fn argv(&self) -> Vec<*const libc::c_char> {
        let mut argv: Vec<_> = self.argv
            .iter()
            .map(|s| s.as_ptr())
            .collect();
        argv.push(std::ptr::null());
        argv
    }
}

// Point stdout and stderr at `/dev/null`. Returns `false` on failure.
unsafe fn silence_output() -> bool {
    let fd = libc::open(DEV_NULL.as_ptr() as *const libc::c_char, libc::O_WRONLY);

    if fd < 0 {
        return false;
    }

    let ok = libc::dup2(fd, libc::STDOUT_FILENO) >= 0 && libc::dup2(fd, libc::STDERR_FILENO) >= 0;
    libc::close(fd);

    ok
}
