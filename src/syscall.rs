//! System call names, prototypes, and entry/exit records.
//!
//! At a syscall-stop the registers hold the call's number and raw arguments on
//! entry, and its return value on exit. The per-architecture prototype tables
//! name each call and say which arguments point at strings, so a [`Syscall`]
//! can render its arguments the way they were meant.

use std::ffi::OsString;
use std::fmt;

use tracing::trace;

use crate::channel::{Addr, Word};
use crate::error::{Error, Result};
use crate::memory::{self, PeekWord};
use crate::registers::Registers;
use crate::tracee::Tracee;

#[cfg(target_arch = "x86")]
use crate::x86 as arch;

#[cfg(target_arch = "x86_64")]
use crate::x86_64 as arch;

/// How a raw argument word is interpreted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParamKind {
    /// Plain integer: a count, flags, or a file descriptor.
    Num,

    /// Pointer into the tracee, not followed.
    Addr,

    /// Pointer to a NUL-terminated string in the tracee, such as a path.
    Str,
}

/// Name and parameter kinds of one system call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Prototype {
    pub number: Word,
    pub name: &'static str,
    pub params: &'static [ParamKind],
}

/// All known prototypes of the target architecture.
pub fn prototypes() -> &'static [Prototype] {
    arch::SYSCALLS
}

pub fn prototype(number: Word) -> Option<&'static Prototype> {
    prototypes().iter().find(|p| p.number == number)
}

/// Name of syscall `number`, if known.
pub fn name(number: Word) -> Option<&'static str> {
    prototype(number).map(|p| p.name)
}

/// Number of the syscall called `name`, if known.
pub fn number(name: &str) -> Option<Word> {
    prototypes().iter().find(|p| p.name == name).map(|p| p.number)
}

/// Convert a selection of syscall names into their numbers, in order.
///
/// Fails on the first unknown name.
pub fn numbers<I, S>(names: I) -> Result<Vec<Word>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| {
            let name = name.as_ref();
            number(name).ok_or_else(|| Error::NoSuchSyscall { name: name.to_owned() })
        })
        .collect()
}

/// Which side of a syscall a record has observed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    Enter,
    Exit,
}

/// Argument value, interpreted by its prototype's parameter kind.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Num(Word),
    Addr(Addr),
    Str(OsString),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{}", n),
            Value::Addr(addr) => write!(f, "{:#x}", addr),
            // Debug quoting escapes newlines and non-UTF-8 bytes.
            Value::Str(s) => write!(f, "{:?}", s),
        }
    }
}

/// One system call, observed at its entry stop and optionally its exit stop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Syscall {
    pub number: Word,
    pub args: [Word; 6],

    /// Return value, set once the exit stop has been seen.
    pub result: Option<Word>,
}

impl Syscall {
    /// Record the syscall a tracee is entering, from its syscall-enter-stop.
    pub fn enter(tracee: &Tracee) -> Result<Self> {
        let syscall = Self::from_registers(&tracee.registers()?);

        trace!(pid = %tracee.pid(), nr = syscall.number, name = ?syscall.name(), "syscall enter");

        Ok(syscall)
    }

    /// Record the return value at the tracee's syscall-exit-stop.
    pub fn exit(&mut self, tracee: &Tracee) -> Result<Word> {
        let result = self.finish(&tracee.registers()?);

        trace!(pid = %tracee.pid(), nr = self.number, result, "syscall exit");

        Ok(result)
    }

    pub fn from_registers(regs: &Registers) -> Self {
        Self {
            number: regs.syscall_number(),
            args: regs.syscall_args(),
            result: None,
        }
    }

    /// Take the return value from an exit-stop snapshot.
    pub fn finish(&mut self, regs: &Registers) -> Word {
        let result = regs.syscall_return();
        self.result = Some(result);
        result
    }

    pub fn state(&self) -> State {
        match self.result {
            Some(_) => State::Exit,
            None => State::Enter,
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        name(self.number)
    }

    pub fn prototype(&self) -> Option<&'static Prototype> {
        prototype(self.number)
    }

    /// Interpret the arguments, reading string arguments from `mem`.
    ///
    /// Only the arguments the prototype declares are returned. An unknown
    /// syscall yields all six argument words as plain numbers.
    pub fn params<P>(&self, mem: &P) -> Result<Vec<Value>>
    where
        P: PeekWord + ?Sized,
    {
        let proto = match self.prototype() {
            Some(proto) => proto,
            None => return Ok(self.args.iter().map(|&arg| Value::Num(arg)).collect()),
        };

        proto.params
            .iter()
            .zip(self.args.iter())
            .map(|(kind, &arg)| {
                let value = match kind {
                    ParamKind::Num => Value::Num(arg),
                    ParamKind::Addr => Value::Addr(arg as Addr),
                    ParamKind::Str => Value::Str(memory::read_cstring(mem, arg as Addr)?),
                };

                Ok(value)
            })
            .collect()
    }
}

/// Renders as `name(args) = result`, without following string pointers.
impl fmt::Display for Syscall {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.prototype() {
            Some(proto) => {
                write!(f, "{}(", proto.name)?;

                for (i, (kind, &arg)) in proto.params.iter().zip(self.args.iter()).enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }

                    match kind {
                        ParamKind::Num => write!(f, "{}", arg)?,
                        ParamKind::Addr | ParamKind::Str => write!(f, "{:#x}", arg as Addr)?,
                    }
                }
            },
            None => {
                write!(f, "syscall_{}(", self.number)?;

                for (i, &arg) in self.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:#x}", arg as Addr)?;
                }
            },
        }

        match self.result {
            Some(result) => write!(f, ") = {}", result),
            None => f.write_str(") = ?"),
        }
    }
}
