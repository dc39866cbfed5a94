//! 256-bit byte membership sets
//!
//! Every Consume instruction carries one of these. `.` is the full set,
//! a literal byte is a singleton, and bracket classes build arbitrary
//! unions of ranges.

use std::fmt;

/// A set of bytes, one bit per possible value
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteSet {
    bits: [u64; 4],
}

impl ByteSet {
    /// The empty set
    pub const fn empty() -> Self {
        ByteSet { bits: [0; 4] }
    }

    /// The set of all 256 bytes
    pub const fn full() -> Self {
        ByteSet {
            bits: [u64::MAX; 4],
        }
    }

    /// A set containing exactly one byte
    pub fn singleton(byte: u8) -> Self {
        let mut set = ByteSet::empty();
        set.insert(byte);
        set
    }

    pub fn insert(&mut self, byte: u8) {
        self.bits[usize::from(byte >> 6)] |= 1u64 << (byte & 63);
    }

    /// Insert every byte in `start..=end`
    pub fn insert_range(&mut self, start: u8, end: u8) {
        for byte in start..=end {
            self.insert(byte);
        }
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.bits[usize::from(byte >> 6)] & (1u64 << (byte & 63)) != 0
    }

    /// Complement the set in place
    pub fn negate(&mut self) {
        for word in &mut self.bits {
            *word = !*word;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate the members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&b| self.contains(b))
    }

    /// Collapse the members into maximal inclusive ranges
    pub fn ranges(&self) -> Vec<(u8, u8)> {
        collapse_ranges(self.iter())
    }
}

/// Collapse an ascending byte sequence into maximal inclusive ranges
pub(crate) fn collapse_ranges(bytes: impl IntoIterator<Item = u8>) -> Vec<(u8, u8)> {
    let mut ranges: Vec<(u8, u8)> = Vec::new();
    for byte in bytes {
        match ranges.last_mut() {
            Some((_, end)) if u16::from(*end) + 1 == u16::from(byte) => *end = byte,
            _ => ranges.push((byte, byte)),
        }
    }
    ranges
}

/// Render one byte the way listings and DOT labels show it
pub(crate) fn fmt_byte(f: &mut impl fmt::Write, byte: u8) -> fmt::Result {
    if byte.is_ascii_graphic() {
        write!(f, "{}", byte as char)
    } else {
        write!(f, "0x{byte:02X}")
    }
}

/// Render a range list like `[a-z]_[0x00-0x1F]`
pub(crate) fn fmt_ranges(f: &mut impl fmt::Write, ranges: &[(u8, u8)]) -> fmt::Result {
    for &(start, end) in ranges {
        if start == end {
            if start.is_ascii_graphic() {
                fmt_byte(f, start)?;
            } else {
                write!(f, " ")?;
                fmt_byte(f, start)?;
                write!(f, " ")?;
            }
        } else {
            write!(f, "[")?;
            fmt_byte(f, start)?;
            write!(f, "-")?;
            fmt_byte(f, end)?;
            write!(f, "]")?;
        }
    }
    Ok(())
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSet(")?;
        fmt_ranges(f, &self.ranges())?;
        write!(f, ")")
    }
}

impl fmt::Display for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == ByteSet::full() {
            return write!(f, ".");
        }
        fmt_ranges(f, &self.ranges())
    }
}

impl FromIterator<u8> for ByteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = ByteSet::empty();
        for byte in iter {
            set.insert(byte);
        }
        set
    }
}
