//! Register layout of x86-64, as exposed by `PTRACE_GETREGS`.

use crate::registers::CpuType;

register_table! {
    CpuType::X86_64;
    R15 => r15,
    R14 => r14,
    R13 => r13,
    R12 => r12,
    Rbp => rbp,
    Rbx => rbx,
    R11 => r11,
    R10 => r10,
    R9 => r9,
    R8 => r8,
    Rax => rax,
    Rcx => rcx,
    Rdx => rdx,
    Rsi => rsi,
    Rdi => rdi,
    OrigRax => orig_rax,
    Rip => rip,
    Cs => cs,
    Eflags => eflags,
    Rsp => rsp,
    Ss => ss,
    FsBase => fs_base,
    GsBase => gs_base,
    Ds => ds,
    Es => es,
    Fs => fs,
    Gs => gs,
}

pub(crate) const SYSCALL_NUMBER: Register = Register::OrigRax;
pub(crate) const SYSCALL_RETURN: Register = Register::Rax;
pub(crate) const INSTRUCTION_POINTER: Register = Register::Rip;
pub(crate) const STACK_POINTER: Register = Register::Rsp;

pub(crate) const SYSCALL_ARGS: [Register; 6] = [
    Register::Rdi,
    Register::Rsi,
    Register::Rdx,
    Register::R10,
    Register::R8,
    Register::R9,
];

/// Offset of the saved syscall number in the virtual `user` struct.
pub(crate) fn syscall_number_offset() -> usize {
    memoffset::offset_of!(libc::user, regs) + memoffset::offset_of!(libc::user_regs_struct, orig_rax)
}

syscall_table! {
    SYS_read => read(Num, Addr, Num),
    SYS_write => write(Num, Addr, Num),
    SYS_open => open(Str, Num, Num),
    SYS_close => close(Num),
    SYS_stat => stat(Str, Addr),
    SYS_fstat => fstat(Num, Addr),
    SYS_lstat => lstat(Str, Addr),
    SYS_lseek => lseek(Num, Num, Num),
    SYS_mmap => mmap(Addr, Num, Num, Num, Num, Num),
    SYS_mprotect => mprotect(Addr, Num, Num),
    SYS_munmap => munmap(Addr, Num),
    SYS_brk => brk(Addr),
    SYS_ioctl => ioctl(Num, Num, Num),
    SYS_pread64 => pread64(Num, Addr, Num, Num),
    SYS_pwrite64 => pwrite64(Num, Addr, Num, Num),
    SYS_access => access(Str, Num),
    SYS_pipe => pipe(Addr),
    SYS_dup => dup(Num),
    SYS_dup2 => dup2(Num, Num),
    SYS_nanosleep => nanosleep(Addr, Addr),
    SYS_getpid => getpid(),
    SYS_socket => socket(Num, Num, Num),
    SYS_connect => connect(Num, Addr, Num),
    SYS_clone => clone(Num, Addr, Addr, Addr, Num),
    SYS_fork => fork(),
    SYS_vfork => vfork(),
    SYS_execve => execve(Str, Addr, Addr),
    SYS_exit => exit(Num),
    SYS_wait4 => wait4(Num, Addr, Num, Addr),
    SYS_kill => kill(Num, Num),
    SYS_uname => uname(Addr),
    SYS_fcntl => fcntl(Num, Num, Num),
    SYS_fsync => fsync(Num),
    SYS_truncate => truncate(Str, Num),
    SYS_ftruncate => ftruncate(Num, Num),
    SYS_getcwd => getcwd(Addr, Num),
    SYS_chdir => chdir(Str),
    SYS_fchdir => fchdir(Num),
    SYS_rename => rename(Str, Str),
    SYS_mkdir => mkdir(Str, Num),
    SYS_rmdir => rmdir(Str),
    SYS_creat => creat(Str, Num),
    SYS_link => link(Str, Str),
    SYS_unlink => unlink(Str),
    SYS_symlink => symlink(Str, Str),
    SYS_readlink => readlink(Str, Addr, Num),
    SYS_chmod => chmod(Str, Num),
    SYS_fchmod => fchmod(Num, Num),
    SYS_chown => chown(Str, Num, Num),
    SYS_umask => umask(Num),
    SYS_getuid => getuid(),
    SYS_getgid => getgid(),
    SYS_getppid => getppid(),
    SYS_arch_prctl => arch_prctl(Num, Addr),
    SYS_gettid => gettid(),
    SYS_set_tid_address => set_tid_address(Addr),
    SYS_exit_group => exit_group(Num),
    SYS_openat => openat(Num, Str, Num, Num),
    SYS_mkdirat => mkdirat(Num, Str, Num),
    SYS_newfstatat => newfstatat(Num, Str, Addr, Num),
    SYS_unlinkat => unlinkat(Num, Str, Num),
    SYS_renameat => renameat(Num, Str, Num, Str),
    SYS_linkat => linkat(Num, Str, Num, Str, Num),
    SYS_symlinkat => symlinkat(Str, Num, Str),
    SYS_readlinkat => readlinkat(Num, Str, Addr, Num),
    SYS_fchmodat => fchmodat(Num, Str, Num),
    SYS_faccessat => faccessat(Num, Str, Num),
    SYS_pipe2 => pipe2(Addr, Num),
    SYS_dup3 => dup3(Num, Num, Num),
    SYS_getrandom => getrandom(Addr, Num, Num),
    SYS_execveat => execveat(Num, Str, Addr, Addr, Num),
}
