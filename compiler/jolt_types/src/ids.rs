//! Index newtypes into the [`ClassTable`](crate::ClassTable) arenas.

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
        }
    };
}

define_id!(
    /// A class declaration. Erased class types are represented by their `ClassId`.
    ClassId
);

define_id!(
    /// A field declaration, instance or static.
    FieldId
);

define_id!(
    /// A method or constructor declaration.
    MethodId
);

define_id!(
    /// A resolved local variable (formals included).
    ///
    /// Assigned by the front end; unique within a compilation unit.
    LocalId
);

/// Convert an arena length into the next sequential raw ID.
pub(crate) fn next_raw(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("arena size exceeds u32::MAX"))
}
