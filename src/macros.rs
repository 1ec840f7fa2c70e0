macro_rules! internal_error {
    ($msg: expr) => {
        return Err($crate::Error::Internal(String::from($msg)))
    };
}

/// Declare the general-purpose register table of one architecture.
///
/// Each entry maps an enum variant to the `libc::user_regs_struct` field it is
/// copied from. The declaration order is the snapshot's iteration order.
macro_rules! register_table {
    ($cpu: expr; $($variant: ident => $field: ident),+ $(,)?) => {
        /// General-purpose register of the target architecture.
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub enum Register {
            $($variant,)+
        }

        impl Register {
            /// All registers, in declaration order.
            pub const ALL: &'static [Register] = &[$(Register::$variant,)+];

            pub const COUNT: usize = Register::ALL.len();

            pub fn name(self) -> &'static str {
                match self {
                    $(Register::$variant => stringify!($field),)+
                }
            }

            pub(crate) fn index(self) -> usize {
                self as usize
            }
        }

        pub(crate) const CPU_TYPE: $crate::registers::CpuType = $cpu;

        pub(crate) fn words(
            regs: &libc::user_regs_struct,
        ) -> [$crate::channel::Word; Register::COUNT] {
            [$(regs.$field as $crate::channel::Word,)+]
        }
    };
}

/// Declare the system call prototypes of one architecture.
///
/// Each entry names the `libc::SYS_*` number constant, then the call's name and
/// parameter kinds, in argument-register order.
macro_rules! syscall_table {
    ($($nr: ident => $name: ident ( $($kind: ident),* )),+ $(,)?) => {
        pub(crate) const SYSCALLS: &[$crate::syscall::Prototype] = &[
            $($crate::syscall::Prototype {
                number: libc::$nr as $crate::channel::Word,
                name: stringify!($name),
                params: &[$($crate::syscall::ParamKind::$kind),*],
            },)+
        ];
    };
}
