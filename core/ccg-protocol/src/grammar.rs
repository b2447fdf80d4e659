use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use bitflags::bitflags;

/// Direction in which a functor category seeks its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum Slash {
    Forward = 0,
    Backward = 1,
}

impl Slash {
    pub const fn symbol(self) -> char {
        match self {
            Slash::Forward => '/',
            Slash::Backward => '\\',
        }
    }

    pub const fn flip(self) -> Slash {
        match self {
            Slash::Forward => Slash::Backward,
            Slash::Backward => Slash::Forward,
        }
    }
}

impl core::fmt::Display for Slash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

bitflags! {
    /// Long-range marking on a slot or dependency.
    ///
    /// A slot that is not extracted is local. An extracted slot is bounded
    /// unless `UNBOUNDED` is also set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct Extraction: u8 {
        const EXTRACTED = 1;
        const UNBOUNDED = 2;
    }
}

impl Extraction {
    pub const fn bounded() -> Self {
        Self::EXTRACTED
    }

    pub const fn unbounded() -> Self {
        Self::EXTRACTED.union(Self::UNBOUNDED)
    }

    /// Bounded or unbounded extraction, chosen by `bounded`.
    pub const fn extracted(bounded: bool) -> Self {
        if bounded {
            Self::bounded()
        } else {
            Self::unbounded()
        }
    }

    pub const fn is_extracted(self) -> bool {
        self.contains(Self::EXTRACTED)
    }

    pub const fn is_bounded(self) -> bool {
        !self.contains(Self::UNBOUNDED)
    }
}

impl Default for Extraction {
    fn default() -> Self {
        Self::empty()
    }
}

// rkyv support for Extraction
impl Archive for Extraction {
    type Archived = u8;
    type Resolver = ();

    unsafe fn resolve(&self, _pos: usize, _resolver: Self::Resolver, out: *mut Self::Archived) {
        out.write(self.bits());
    }
}

impl<S: rkyv::ser::Serializer + ?Sized> Serialize<S> for Extraction {
    fn serialize(&self, _serializer: &mut S) -> Result<Self::Resolver, S::Error> {
        Ok(())
    }
}

impl<D: rkyv::Fallible + ?Sized> Deserialize<Extraction, D> for u8 {
    fn deserialize(&self, _deserializer: &mut D) -> Result<Extraction, D::Error> {
        Ok(Extraction::from_bits_truncate(*self))
    }
}
