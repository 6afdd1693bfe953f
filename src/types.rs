use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Policy bits attached to a rule.
///
/// This is a bitset, not a single-choice enum: a wildcard rule is also a
/// plain rule, and an exception can share a suffix with its wildcard.
/// `INCLUDE_SUBDOMAINS` sits at bit 0 so compact table return values map
/// onto it directly.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u8);

impl Flags {
    pub const INCLUDE_SUBDOMAINS: Self = Self(1 << 0);
    pub const EXCEPTION: Self = Self(1 << 1);
    pub const WILDCARD: Self = Self(1 << 2);
    pub const ICANN: Self = Self(1 << 3);
    pub const PRIVATE: Self = Self(1 << 4);
    pub const PLAIN: Self = Self(1 << 5);

    const ALL: u8 = 0x3f;
    const SECTIONS: u8 = Self::ICANN.0 | Self::PRIVATE.0;

    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds flags from raw bits, dropping unknown ones.
    ///
    /// A rule belongs to at most one section; if both section bits are
    /// set, `ICANN` is kept.
    #[inline]
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        let bits = bits & Self::ALL;
        if bits & Self::SECTIONS == Self::SECTIONS {
            Self(bits & !Self::PRIVATE.0)
        } else {
            Self(bits)
        }
    }

    /// Maps a compact table return value onto flags.
    ///
    /// Table values are 4-bit; only bit 0 (include subdomains) is defined
    /// for HSTS artifacts.
    #[inline]
    #[must_use]
    pub const fn from_table_value(value: u8) -> Self {
        Self(value & Self::INCLUDE_SUBDOMAINS.0)
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn has_include_subdomains(self) -> bool {
        self.contains(Self::INCLUDE_SUBDOMAINS)
    }

    #[inline]
    pub fn is_exception(self) -> bool {
        self.contains(Self::EXCEPTION)
    }

    #[inline]
    pub fn is_wildcard(self) -> bool {
        self.contains(Self::WILDCARD)
    }

    #[inline]
    pub fn is_plain(self) -> bool {
        self.contains(Self::PLAIN)
    }

    /// Provenance section, if any.
    pub fn section(self) -> Option<Section> {
        if self.contains(Self::ICANN) {
            Some(Section::Icann)
        } else if self.contains(Self::PRIVATE) {
            Some(Section::Private)
        } else {
            None
        }
    }

    /// Unions `other` into `self`, keeping the existing section if both
    /// carry a different one.
    ///
    /// Returns `true` when `other`'s section was dropped.
    pub fn merge(&mut self, other: Flags) -> bool {
        let mine = self.0 & Self::SECTIONS;
        let theirs = other.0 & Self::SECTIONS;
        if mine != 0 && theirs != 0 && mine != theirs {
            self.0 |= other.0 & !Self::SECTIONS;
            return true;
        }
        self.0 |= other.0;
        false
    }
}

/// Same as [`Flags::merge`]: the left-hand section wins a conflict.
impl BitOr for Flags {
    type Output = Self;

    fn bitor(mut self, rhs: Self) -> Self::Output {
        self.merge(rhs);
        self
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.merge(rhs);
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Flags, &str); 6] = [
            (Flags::INCLUDE_SUBDOMAINS, "INCLUDE_SUBDOMAINS"),
            (Flags::EXCEPTION, "EXCEPTION"),
            (Flags::WILDCARD, "WILDCARD"),
            (Flags::ICANN, "ICANN"),
            (Flags::PRIVATE, "PRIVATE"),
            (Flags::PLAIN, "PLAIN"),
        ];

        if self.is_empty() {
            return f.write_str("Flags(empty)");
        }
        f.write_str("Flags(")?;
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}

/// Rule list section a rule was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Icann,
    Private,
}

impl Section {
    /// Flag bit tagging rules parsed inside this section
    pub fn flag(self) -> Flags {
        match self {
            Section::Icann => Flags::ICANN,
            Section::Private => Flags::PRIVATE,
        }
    }
}

/// Search result: the flags of the winning rule.
///
/// Owns a copy of the flags, so it does not borrow the context it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub flags: Flags,
}

impl Entry {
    pub fn new(flags: Flags) -> Self {
        Self { flags }
    }

    /// Whether the policy applies to all subdomains of the matched name
    pub fn has_include_subdomains(&self) -> bool {
        self.flags.has_include_subdomains()
    }

    pub fn is_exception(&self) -> bool {
        self.flags.is_exception()
    }

    pub fn is_wildcard(&self) -> bool {
        self.flags.is_wildcard()
    }

    pub fn section(&self) -> Option<Section> {
        self.flags.section()
    }
}

/// Per-context rule counters, filled by the text compiler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleCounts {
    /// Plain and wildcard rule lines
    pub suffixes: usize,
    /// Exception rule lines
    pub exceptions: usize,
    /// Wildcard rule lines
    pub wildcards: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_combine() {
        let flags = Flags::WILDCARD | Flags::PLAIN | Flags::ICANN;
        assert!(flags.is_wildcard());
        assert!(flags.is_plain());
        assert!(!flags.is_exception());
        assert_eq!(flags.section(), Some(Section::Icann));
    }

    #[test]
    fn test_exception_and_wildcard_coexist() {
        let mut flags = Flags::EXCEPTION | Flags::PRIVATE;
        let dropped = flags.merge(Flags::WILDCARD | Flags::PLAIN | Flags::PRIVATE);
        assert!(!dropped);
        assert!(flags.is_exception());
        assert!(flags.is_wildcard());
        assert!(flags.is_plain());
        assert_eq!(flags.section(), Some(Section::Private));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let rule = Flags::PLAIN | Flags::ICANN;
        let mut once = Flags::empty();
        once.merge(rule);
        let mut twice = once;
        twice.merge(rule);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_keeps_first_section() {
        let mut flags = Flags::PLAIN | Flags::ICANN;
        let dropped = flags.merge(Flags::EXCEPTION | Flags::PRIVATE);
        assert!(dropped);
        assert!(flags.is_exception());
        assert!(flags.contains(Flags::ICANN));
        assert!(!flags.contains(Flags::PRIVATE));
    }

    #[test]
    fn test_merge_adopts_section_when_none() {
        let mut flags = Flags::PLAIN;
        assert!(!flags.merge(Flags::PLAIN | Flags::PRIVATE));
        assert_eq!(flags.section(), Some(Section::Private));
    }

    #[test]
    fn test_table_value_only_maps_include_subdomains() {
        assert!(Flags::from_table_value(1).has_include_subdomains());
        assert!(Flags::from_table_value(0).is_empty());
        // Undefined table bits must not surface as PSL flags
        assert_eq!(Flags::from_table_value(0x0e), Flags::empty());
    }

    #[test]
    fn test_from_bits_truncate_drops_unknown() {
        assert_eq!(Flags::from_bits_truncate(0xc0), Flags::empty());
        assert_eq!(
            Flags::from_bits_truncate(0xe1),
            Flags::INCLUDE_SUBDOMAINS | Flags::PLAIN
        );
    }

    #[test]
    fn test_at_most_one_section() {
        let flags = Flags::from_bits_truncate(0xff);
        assert!(flags.contains(Flags::ICANN));
        assert!(!flags.contains(Flags::PRIVATE));
        assert_eq!(flags.section(), Some(Section::Icann));

        let flags = Flags::PRIVATE | Flags::ICANN;
        assert_eq!(flags, Flags::PRIVATE);
        assert_eq!(flags.section(), Some(Section::Private));

        let mut flags = Flags::PLAIN | Flags::ICANN;
        flags |= Flags::PRIVATE | Flags::WILDCARD;
        assert_eq!(flags, Flags::PLAIN | Flags::ICANN | Flags::WILDCARD);
    }

    #[test]
    fn test_debug_lists_names() {
        let flags = Flags::EXCEPTION | Flags::ICANN;
        assert_eq!(format!("{:?}", flags), "Flags(EXCEPTION | ICANN)");
        assert_eq!(format!("{:?}", Flags::empty()), "Flags(empty)");
    }

    #[test]
    fn test_entry_accessors() {
        let entry = Entry::new(Flags::INCLUDE_SUBDOMAINS);
        assert!(entry.has_include_subdomains());
        assert!(!entry.is_exception());
        assert!(!entry.is_wildcard());
        assert_eq!(entry.section(), None);
    }
}
