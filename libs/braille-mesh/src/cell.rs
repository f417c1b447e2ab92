//! # Cell Decoder
//!
//! Converts Unicode braille cells (U+2800..U+28FF) into six-dot patterns.
//!
//! Dots are numbered 1–6 down the left column then down the right column:
//!
//! ```text
//! 1 4
//! 2 5
//! 3 6
//! ```

/// First code point of the Unicode braille block.
pub const BRAILLE_BASE: u32 = 0x2800;

/// Last code point of the Unicode braille block.
pub const BRAILLE_LAST: u32 = 0x28FF;

/// Raised dots of one six-dot braille cell.
///
/// Bit `i` is dot `i + 1`, matching the Unicode braille bit layout.
///
/// # Example
///
/// ```rust
/// use braille_mesh::cell::DotPattern;
///
/// let b = DotPattern::decode('⠃');
/// assert!(b.has_dot(1));
/// assert!(b.has_dot(2));
/// assert_eq!(b.dot_count(), 2);
/// assert_eq!(b.encode(), '⠃');
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DotPattern(u8);

impl DotPattern {
    /// Pattern with no raised dots.
    pub const EMPTY: Self = Self(0);

    /// Pattern with all six dots raised.
    pub const FULL: Self = Self(0b11_1111);

    /// Creates a pattern from a 6-bit mask. Bits 6 and 7 are dropped.
    pub const fn from_mask(mask: u8) -> Self {
        Self(mask & 0b11_1111)
    }

    /// Creates a pattern from a list of dot numbers (1–6).
    ///
    /// Numbers outside 1–6 are ignored.
    pub fn from_dots(dots: &[u8]) -> Self {
        let mask = dots
            .iter()
            .filter(|&&d| (1..=6).contains(&d))
            .fold(0u8, |mask, &d| mask | (1 << (d - 1)));
        Self(mask)
    }

    /// Decodes a braille cell character.
    ///
    /// Anything outside the braille block decodes to [`DotPattern::EMPTY`],
    /// so whitespace and untranslated characters become blank cells.
    pub fn decode(cell: char) -> Self {
        let cp = cell as u32;
        if (BRAILLE_BASE..=BRAILLE_LAST).contains(&cp) {
            Self::from_mask((cp - BRAILLE_BASE) as u8)
        } else {
            Self::EMPTY
        }
    }

    /// Encodes the pattern as a braille cell character.
    pub fn encode(self) -> char {
        // The mask is at most 0x3F, so the code point is always in range.
        char::from_u32(BRAILLE_BASE + self.0 as u32).unwrap_or('\u{2800}')
    }

    /// Returns the 6-bit mask.
    #[inline]
    pub const fn mask(self) -> u8 {
        self.0
    }

    /// Returns true if dot `n` (1–6) is raised.
    #[inline]
    pub fn has_dot(self, n: u8) -> bool {
        (1..=6).contains(&n) && self.0 & (1 << (n - 1)) != 0
    }

    /// Returns true if no dot is raised.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of raised dots.
    #[inline]
    pub const fn dot_count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates over raised dot numbers in ascending order.
    pub fn dots(self) -> impl Iterator<Item = u8> {
        (1..=6u8).filter(move |&n| self.has_dot(n))
    }
}

/// Grid position of dot `n` (1–6) inside a cell as `(row, col)`.
///
/// Rows count 0–2 from the top, columns 0–1 from the left.
///
/// # Example
///
/// ```rust
/// use braille_mesh::cell::dot_slot;
///
/// assert_eq!(dot_slot(1), Some((0, 0)));
/// assert_eq!(dot_slot(6), Some((2, 1)));
/// assert_eq!(dot_slot(7), None);
/// ```
pub fn dot_slot(n: u8) -> Option<(usize, usize)> {
    match n {
        1..=3 => Some(((n - 1) as usize, 0)),
        4..=6 => Some(((n - 4) as usize, 1)),
        _ => None,
    }
}

/// Decodes every character of a line.
pub fn decode_line(line: &str) -> Vec<DotPattern> {
    line.chars().map(DotPattern::decode).collect()
}
