use std::env;
use std::path::PathBuf;

use structopt::StructOpt;
use tracekit::syscall::{self, Value};
use tracekit::{Addr, Command, Options, Signal, Stop, Syscall, Tracee};
use tracing_subscriber::EnvFilter;

/// Run a command, printing each selected syscall it makes with its arguments.
#[derive(Debug, StructOpt)]
struct Opt {
    /// Print the register snapshot at each selected syscall entry.
    #[structopt(short, long)]
    registers: bool,

    /// Syscalls to print, by name.
    #[structopt(short, long, default_value = "execve", use_delimiter = true, number_of_values = 1)]
    syscalls: Vec<String>,

    /// Print every syscall, not just the selected ones.
    #[structopt(short, long)]
    verbose: bool,

    /// Command to trace, with its arguments.
    #[structopt(required = true)]
    argv: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut opt = Opt::from_args();
    opt.argv[0] = find_program(&opt.argv[0])?;

    let pid = Command::new(opt.argv.clone())?.fork_exec()?;
    let tracee = Tracee::new(pid);

    // Pre-exec `SIGSTOP`.
    tracee.wait()?;
    tracee.set_options(Options::PTRACE_O_TRACESYSGOOD | Options::PTRACE_O_TRACEEXEC)?;

    let selection = syscall::numbers(&opt.syscalls)?;
    let execve = syscall::number("execve");

    let mut current: Option<Syscall> = None;
    let mut pending: Option<Signal> = None;

    loop {
        tracee.syscall(pending.take())?;

        match tracee.wait()? {
            Stop::Syscall => match current.take() {
                None => {
                    let call = Syscall::enter(&tracee)?;

                    if opt.verbose || selection.contains(&call.number) {
                        let params: Vec<String> = call.params(&tracee)?
                            .iter()
                            .map(Value::to_string)
                            .collect();
                        let name = call.name().unwrap_or("unknown");

                        println!("[{}] {}({}) = ?", pid, name, params.join(", "));

                        if Some(call.number) == execve {
                            let argv = tracee.string_vector(call.args[1] as Addr)?;
                            println!("[{}]   argv = {:?}", pid, argv);
                        }

                        if opt.registers {
                            println!("{}", tracee.registers()?);
                        }
                    }

                    current = Some(call);
                },
                Some(mut call) => {
                    call.exit(&tracee)?;

                    if opt.verbose || selection.contains(&call.number) {
                        println!("[{}] {}", pid, call);
                    }
                },
            },
            Stop::Exec { .. } => {
                println!("[{}] exec ok", pid);
            },
            Stop::SignalDelivery { signal } => {
                pending = Some(signal);
            },
            stop @ Stop::Exited { .. } | stop @ Stop::Killed { .. } => {
                println!("[{}] {:?}", pid, stop);
                break;
            },
            stop => {
                println!("[{}] {:?}", pid, stop);
            },
        }
    }

    Ok(())
}

fn find_program(program: &str) -> anyhow::Result<String> {
    if program.contains('/') {
        return Ok(program.to_owned());
    }

    let path = env::var_os("PATH").unwrap_or_default();

    let found = env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate: &PathBuf| candidate.is_file());

    match found {
        Some(found) => Ok(found.to_string_lossy().into_owned()),
        None => anyhow::bail!("program not found: {}", program),
    }
}
