//! Strongly typed identifier wrappers.
//!
//! Detector lane numbers and sign numbers are both small integers on the
//! wire; wrapping them keeps a lane id from being passed where a sign id is
//! expected.  Both are `Copy + Ord + Hash` so they work as map keys.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw wire value.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Detector lane number as reported by roadside telemetry.
    pub struct LaneId(u32);
}

typed_id! {
    /// Variable message sign number.
    pub struct SignId(u32);
}
