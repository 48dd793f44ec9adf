//! ID newtypes for IR arenas.
//!
//! All IDs are `Copy`, 4 bytes, and index into a `Vec` owned by the
//! [`Module`](crate::Module) or [`TypeTable`](crate::TypeTable).

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create an ID from a raw index.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Get the raw `u32` value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }

            /// Get the index as `usize` (for indexing into `Vec`s).
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// The ID the next push onto an arena of length `len` receives.
            pub(crate) fn next(len: usize) -> Self {
                Self(u32::try_from(len).unwrap_or_else(|_| {
                    panic!(concat!(stringify!($name), " count exceeds u32::MAX"))
                }))
            }
        }
    };
}

define_id!(
    /// An interned IR type.
    TypeId
);

define_id!(
    /// A named struct record (opaque or filled).
    StructId
);

define_id!(
    /// A value: constant, parameter, global address, or instruction result.
    ValueId
);

define_id!(
    /// A basic block, local to its function. Block 0 is the entry block.
    BlockId
);

define_id!(
    /// A function, defined or declared.
    FunctionId
);

define_id!(
    /// A module-level global variable.
    GlobalId
);
