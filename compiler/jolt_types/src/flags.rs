//! Declaration modifiers.

use bitflags::bitflags;

bitflags! {
    /// Modifiers on classes, fields and procedures.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Flags: u16 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const NATIVE = 1 << 6;
    }
}

impl Flags {
    #[inline]
    pub fn is_static(self) -> bool {
        self.contains(Self::STATIC)
    }

    #[inline]
    pub fn is_public(self) -> bool {
        self.contains(Self::PUBLIC)
    }

    /// Native and abstract procedures have no body to translate.
    #[inline]
    pub fn has_no_implementation(self) -> bool {
        self.intersects(Self::NATIVE | Self::ABSTRACT)
    }
}
