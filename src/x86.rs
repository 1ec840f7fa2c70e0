//! Register layout of 32-bit x86, as exposed by `PTRACE_GETREGS`.

use crate::registers::CpuType;

register_table! {
    CpuType::X86;
    Ebx => ebx,
    Ecx => ecx,
    Edx => edx,
    Esi => esi,
    Edi => edi,
    Ebp => ebp,
    Eax => eax,
    Xds => xds,
    Xes => xes,
    Xfs => xfs,
    Xgs => xgs,
    OrigEax => orig_eax,
    Eip => eip,
    Xcs => xcs,
    Eflags => eflags,
    Esp => esp,
    Xss => xss,
}

pub(crate) const SYSCALL_NUMBER: Register = Register::OrigEax;
pub(crate) const SYSCALL_RETURN: Register = Register::Eax;
pub(crate) const INSTRUCTION_POINTER: Register = Register::Eip;
pub(crate) const STACK_POINTER: Register = Register::Esp;

/// Argument registers of the `int 0x80` syscall convention.
pub(crate) const SYSCALL_ARGS: [Register; 6] = [
    Register::Ebx,
    Register::Ecx,
    Register::Edx,
    Register::Esi,
    Register::Edi,
    Register::Ebp,
];

/// Offset of the saved syscall number in the virtual `user` struct.
pub(crate) fn syscall_number_offset() -> usize {
    memoffset::offset_of!(libc::user, regs) + memoffset::offset_of!(libc::user_regs_struct, orig_eax)
}

syscall_table! {
    SYS_exit => exit(Num),
    SYS_fork => fork(),
    SYS_read => read(Num, Addr, Num),
    SYS_write => write(Num, Addr, Num),
    SYS_open => open(Str, Num, Num),
    SYS_close => close(Num),
    SYS_waitpid => waitpid(Num, Addr, Num),
    SYS_creat => creat(Str, Num),
    SYS_link => link(Str, Str),
    SYS_unlink => unlink(Str),
    SYS_execve => execve(Str, Addr, Addr),
    SYS_chdir => chdir(Str),
    SYS_chmod => chmod(Str, Num),
    SYS_lseek => lseek(Num, Num, Num),
    SYS_getpid => getpid(),
    SYS_access => access(Str, Num),
    SYS_kill => kill(Num, Num),
    SYS_rename => rename(Str, Str),
    SYS_mkdir => mkdir(Str, Num),
    SYS_rmdir => rmdir(Str),
    SYS_dup => dup(Num),
    SYS_pipe => pipe(Addr),
    SYS_brk => brk(Addr),
    SYS_ioctl => ioctl(Num, Num, Num),
    SYS_fcntl => fcntl(Num, Num, Num),
    SYS_umask => umask(Num),
    SYS_dup2 => dup2(Num, Num),
    SYS_getppid => getppid(),
    SYS_symlink => symlink(Str, Str),
    SYS_readlink => readlink(Str, Addr, Num),
    SYS_munmap => munmap(Addr, Num),
    SYS_truncate => truncate(Str, Num),
    SYS_ftruncate => ftruncate(Num, Num),
    SYS_fchmod => fchmod(Num, Num),
    SYS_wait4 => wait4(Num, Addr, Num, Addr),
    SYS_fsync => fsync(Num),
    SYS_clone => clone(Num, Addr, Addr, Num, Addr),
    SYS_uname => uname(Addr),
    SYS_mprotect => mprotect(Addr, Num, Num),
    SYS_fchdir => fchdir(Num),
    SYS_nanosleep => nanosleep(Addr, Addr),
    SYS_getcwd => getcwd(Addr, Num),
    SYS_vfork => vfork(),
    SYS_mmap2 => mmap2(Addr, Num, Num, Num, Num, Num),
    SYS_stat64 => stat64(Str, Addr),
    SYS_lstat64 => lstat64(Str, Addr),
    SYS_fstat64 => fstat64(Num, Addr),
    SYS_gettid => gettid(),
    SYS_set_thread_area => set_thread_area(Addr),
    SYS_exit_group => exit_group(Num),
    SYS_set_tid_address => set_tid_address(Addr),
    SYS_openat => openat(Num, Str, Num, Num),
    SYS_mkdirat => mkdirat(Num, Str, Num),
    SYS_fstatat64 => fstatat64(Num, Str, Addr, Num),
    SYS_unlinkat => unlinkat(Num, Str, Num),
    SYS_renameat => renameat(Num, Str, Num, Str),
    SYS_readlinkat => readlinkat(Num, Str, Addr, Num),
    SYS_fchmodat => fchmodat(Num, Str, Num),
    SYS_faccessat => faccessat(Num, Str, Num),
    SYS_dup3 => dup3(Num, Num, Num),
    SYS_pipe2 => pipe2(Addr, Num),
    SYS_getrandom => getrandom(Addr, Num, Num),
    SYS_execveat => execveat(Num, Str, Addr, Addr, Num),
}
