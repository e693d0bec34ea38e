//! Arena handles for vcode entities.
//!
//! Registers, blocks and variables are indices into arenas owned by one
//! [`Unit`](crate::Unit); types are indices into the interned type table
//! of the [`Vcode`](crate::Vcode) context. Using a handle with the wrong
//! unit is a contract violation caught by bounds assertions, not a data
//! error.

use std::fmt;

macro_rules! vcode_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Sentinel meaning "no value".
            pub const INVALID: Self = Self(u32::MAX);

            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }

            pub(crate) fn from_len(len: usize) -> Self {
                Self(u32::try_from(len).unwrap_or_else(|_| {
                    panic!(concat!(stringify!($name), " count exceeds u32::MAX"))
                }))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($prefix, "{}"), self.0)
                } else {
                    f.write_str(concat!($prefix, "<invalid>"))
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

vcode_id!(
    /// SSA-style value slot, defined by exactly one operation or parameter.
    VReg,
    "r"
);
vcode_id!(
    /// Basic block within a unit.
    VBlock,
    "bb"
);
vcode_id!(
    /// Mutable storage location scoped to a unit.
    VVar,
    "v"
);
vcode_id!(
    /// Interned type descriptor.
    VType,
    "t"
);
vcode_id!(
    /// A unit owned by a [`Vcode`](crate::Vcode) context.
    UnitId,
    "u"
);
