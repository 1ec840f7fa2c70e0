//! Named snapshot of a tracee's general-purpose registers.

use std::convert::TryInto;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::channel::{self, Request, UWord, Word, WORD_SIZE};
use crate::error::{Error, Result};
use crate::Pid;

#[cfg(target_arch = "x86")]
use crate::x86 as arch;

#[cfg(target_arch = "x86_64")]
use crate::x86_64 as arch;

pub use arch::Register;

/// CPU family a register snapshot was taken on.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CpuType {
    Unknown = 0,
    X86 = 1,
    X86_64 = 2,
}

impl Register {
    /// Saved syscall number register, also reachable via `PTRACE_PEEKUSER`.
    pub const SYSCALL_NUMBER: Register = arch::SYSCALL_NUMBER;

    pub(crate) fn syscall_number_offset() -> usize {
        arch::syscall_number_offset()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Register::ALL
            .iter()
            .copied()
            .find(|r| r.name() == name)
            .ok_or_else(|| Error::NoSuchRegister { name: name.to_owned() })
    }
}

/// Point-in-time copy of a tracee's general-purpose registers.
///
/// Writes only update this copy. The tracee is never modified.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Registers {
    cpu_type: CpuType,
    values: [Word; Register::COUNT],
}

impl Registers {
    /// Snapshot with every register zeroed.
    pub fn new() -> Self {
        Self {
            cpu_type: arch::CPU_TYPE,
            values: [0; Register::COUNT],
        }
    }

    /// Read the registers of the stopped tracee `pid` with `PTRACE_GETREGS`.
    pub fn read_from(pid: Pid) -> Result<Self> {
        let regs: libc::user_regs_struct = channel::read_struct(Request::PTRACE_GETREGS, pid)?;

        Ok(Self::from(&regs))
    }

    pub fn cpu_type(&self) -> CpuType {
        self.cpu_type
    }

    /// Names of the supported registers, in snapshot order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Register::ALL.iter().map(|r| r.name())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a register value by name.
    pub fn get(&self, name: &str) -> Result<Word> {
        let reg: Register = name.parse()?;
        Ok(self[reg])
    }

    /// Update the value of the named register in this snapshot.
    ///
    /// Fails if `name` is unknown, or if `value` does not fit a signed word.
    pub fn set<V>(&mut self, name: &str, value: V) -> Result<()>
    where
        V: TryInto<Word> + Copy + fmt::Display,
    {
        let register: Register = name.parse()?;

        let word = value.try_into().map_err(|_| Error::RegisterValue {
            register,
            value: value.to_string(),
        })?;

        self[register] = word;

        Ok(())
    }

    pub fn register(&self, reg: Register) -> Word {
        self.values[reg.index()]
    }

    pub fn set_register(&mut self, reg: Register, value: Word) {
        self.values[reg.index()] = value;
    }

    /// Registers and their values, in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = (Register, Word)> + '_ {
        Register::ALL.iter().map(move |&r| (r, self[r]))
    }

    pub fn syscall_number(&self) -> Word {
        self[arch::SYSCALL_NUMBER]
    }

    /// Syscall arguments, in calling-convention order.
    pub fn syscall_args(&self) -> [Word; 6] {
        let mut args = [0; 6];

        for (arg, &reg) in args.iter_mut().zip(arch::SYSCALL_ARGS.iter()) {
            *arg = self[reg];
        }

        args
    }

    /// Return value of a syscall, valid at syscall-exit.
    pub fn syscall_return(&self) -> Word {
        self[arch::SYSCALL_RETURN]
    }

    pub fn instruction_pointer(&self) -> Word {
        self[arch::INSTRUCTION_POINTER]
    }

    pub fn stack_pointer(&self) -> Word {
        self[arch::STACK_POINTER]
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&libc::user_regs_struct> for Registers {
    fn from(regs: &libc::user_regs_struct) -> Self {
        Self {
            cpu_type: arch::CPU_TYPE,
            values: arch::words(regs),
        }
    }
}

impl Index<Register> for Registers {
    type Output = Word;

    fn index(&self, reg: Register) -> &Word {
        &self.values[reg.index()]
    }
}

impl IndexMut<Register> for Registers {
    fn index_mut(&mut self, reg: Register) -> &mut Word {
        &mut self.values[reg.index()]
    }
}

/// Renders `name=0x<hex>` pairs, space-separated, each value padded to the
/// width of a machine word.
impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = 2 * WORD_SIZE;

        for (i, (reg, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }

            write!(f, "{}=0x{:0width$x}", reg, value as UWord, width = width)?;
        }

        Ok(())
    }
}
