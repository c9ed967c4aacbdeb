use std::fmt;
use std::ops::BitOr;

/// String comparison flags, rendered as a bracketed suffix on the operator.
///
/// The flags form a set: `CASE_INSENSITIVE | DIACRITIC_INSENSITIVE` and
/// `DIACRITIC_INSENSITIVE | CASE_INSENSITIVE` are the same value and both
/// render as `[cd]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ComparisonOptions {
    bits: u8,
}

impl ComparisonOptions {
    pub const NONE: Self = Self { bits: 0 };
    /// `[c]`
    pub const CASE_INSENSITIVE: Self = Self { bits: 0b01 };
    /// `[d]`
    pub const DIACRITIC_INSENSITIVE: Self = Self { bits: 0b10 };

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.bits & other.bits == other.bits
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Parse the letters between the brackets of an operator suffix.
    /// Returns `None` for an empty or unrecognized flag string.
    #[must_use]
    pub fn from_flags(flags: &str) -> Option<Self> {
        if flags.is_empty() {
            return None;
        }
        flags.chars().try_fold(Self::NONE, |acc, c| match c {
            'c' => Some(acc | Self::CASE_INSENSITIVE),
            'd' => Some(acc | Self::DIACRITIC_INSENSITIVE),
            _ => None,
        })
    }
}

impl BitOr for ComparisonOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl FromIterator<ComparisonOptions> for ComparisonOptions {
    fn from_iter<I: IntoIterator<Item = ComparisonOptions>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::union)
    }
}

impl fmt::Display for ComparisonOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        if self.contains(Self::CASE_INSENSITIVE) {
            f.write_str("c")?;
        }
        if self.contains(Self::DIACRITIC_INSENSITIVE) {
            f.write_str("d")?;
        }
        f.write_str("]")
    }
}

/// How the left-hand key path of a comparison is quantified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Modifier {
    #[default]
    Direct,
    Any,
    All,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Direct => Ok(()),
            Modifier::Any => f.write_str("ANY "),
            Modifier::All => f.write_str("ALL "),
        }
    }
}
