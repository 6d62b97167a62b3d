// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A declarative macro for flag sets whose names are needed at runtime.
//!
//! Pipeline state, barrier and clear masks are printed by the pass serializer,
//! so besides the usual set operations every generated type can enumerate the
//! names of the flags it contains.

/// Declares a flag set backed by an unsigned integer.
///
/// Flags with a value of `0` are accepted but never reported by `iter_names`.
#[macro_export]
#[doc(hidden)]
macro_rules! vesper_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            const NAMED: &'static [(&'static str, $ty)] = &[
                $((stringify!($flag_name), $flag_value),)*
            ];

            /// Creates a flag set from raw bits. Unknown bits are kept.
            pub const fn from_bits_retain(bits: $ty) -> Self {
                Self { bits }
            }

            /// Returns the raw value of the flag set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if all flags in `other` are contained within `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is contained within `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Inserts the flags in `other` into `self`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Removes the flags in `other` from `self`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Returns a new set with `other` inserted.
            #[must_use]
            pub const fn with(mut self, other: Self) -> Self {
                self.bits |= other.bits;
                self
            }

            /// Returns a new set with `other` removed.
            #[must_use]
            pub const fn without(mut self, other: Self) -> Self {
                self.bits &= !other.bits;
                self
            }

            /// Iterates over the names of the declared flags fully contained in `self`,
            /// in declaration order.
            pub fn iter_names(self) -> impl Iterator<Item = &'static str> {
                Self::NAMED
                    .iter()
                    .filter(move |(_, value)| *value != 0 && (self.bits & *value) == *value)
                    .map(|(name, _)| *name)
            }

            /// Bits that do not belong to any declared flag.
            pub fn unknown_bits(self) -> $ty {
                let mut rest = self.bits;
                for (_, value) in Self::NAMED {
                    rest &= !*value;
                }
                rest
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::ops::Not for $name {
            type Output = Self;
            fn not(self) -> Self {
                Self { bits: !self.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::ops::BitAndAssign for $name {
            fn bitand_assign(&mut self, other: Self) {
                self.bits &= other.bits;
            }
        }

        impl core::fmt::Display for $name {
            /// Writes the contained flag names joined by `|`, or `NONE`.
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut first = true;
                for name in self.iter_names() {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", name)?;
                    first = false;
                }
                let unknown = self.unknown_bits();
                if unknown != 0 {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "UNKNOWN({:#x})", unknown)?;
                    first = false;
                }
                if first {
                    write!(f, "NONE")?;
                }
                Ok(())
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{} {{ {} }}", stringify!($name), self)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::vesper_bitflags;

    vesper_bitflags! {
        /// Flags used only by these tests.
        pub struct TestFlags: u32 {
            const FLAG_A = 1 << 0;
            const FLAG_B = 1 << 1;
            const FLAG_C = 1 << 2;
            const NONE_FLAG = 0;
        }
    }

    #[test]
    fn test_set_operations() {
        let mut flags = TestFlags::FLAG_A | TestFlags::FLAG_C;
        assert!(flags.contains(TestFlags::FLAG_A));
        assert!(!flags.contains(TestFlags::FLAG_B));
        assert!(flags.intersects(TestFlags::FLAG_C | TestFlags::FLAG_B));

        flags.remove(TestFlags::FLAG_A);
        assert_eq!(flags, TestFlags::FLAG_C);

        flags.insert(TestFlags::FLAG_B);
        assert_eq!(flags.bits(), 0b110);
        assert_eq!(flags.without(TestFlags::FLAG_B), TestFlags::FLAG_C);
    }

    #[test]
    fn test_names_follow_declaration_order() {
        let flags = TestFlags::FLAG_C | TestFlags::FLAG_A;
        let names: Vec<_> = flags.iter_names().collect();
        assert_eq!(names, vec!["FLAG_A", "FLAG_C"]);
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(TestFlags::EMPTY.to_string(), "NONE");
        assert_eq!((TestFlags::FLAG_A | TestFlags::FLAG_B).to_string(), "FLAG_A | FLAG_B");
        let with_unknown = TestFlags::from_bits_retain(0b1000_0001);
        assert_eq!(with_unknown.to_string(), "FLAG_A | UNKNOWN(0x80)");
        assert_eq!(
            format!("{:?}", TestFlags::FLAG_B),
            "TestFlags { FLAG_B }"
        );
    }
}
