//! The four RCNB symbol classes and the radix constants derived from them.
//!
//! Every class is a fixed, ordered list of look-alike characters. A symbol's
//! position inside its class is the digit it carries. The classes are
//! disjoint, so a received character identifies both its class and its digit.

use std::fmt;
use std::sync::OnceLock;

/// R-class symbols (15).
pub const R: [char; 15] = [
    'r', 'R', 'Ŕ', 'ŕ', 'Ŗ', 'ŗ', 'Ř', 'ř', 'Ʀ', 'Ȑ', 'ȑ', 'Ȓ', 'ȓ', 'Ɍ', 'ɍ',
];

/// C-class symbols (15).
pub const C: [char; 15] = [
    'c', 'C', 'Ć', 'ć', 'Ĉ', 'ĉ', 'Ċ', 'ċ', 'Č', 'č', 'Ƈ', 'ƈ', 'Ç', 'Ȼ', 'ȼ',
];

/// N-class symbols (15).
pub const N: [char; 15] = [
    'n', 'N', 'Ń', 'ń', 'Ņ', 'ņ', 'Ň', 'ň', 'Ɲ', 'ƞ', 'Ñ', 'Ǹ', 'ǹ', 'Ƞ', 'ȵ',
];

/// B-class symbols (10).
pub const B: [char; 10] = ['b', 'B', 'ƀ', 'Ɓ', 'ƃ', 'Ƅ', 'ƅ', 'ß', 'Þ', 'þ'];

pub const SR: u16 = R.len() as u16;
pub const SC: u16 = C.len() as u16;
pub const SN: u16 = N.len() as u16;
pub const SB: u16 = B.len() as u16;

/// Weight of the N digit in a four-symbol group.
pub const SNB: u16 = SN * SB;
/// Weight of the R digit in a four-symbol group.
pub const SCNB: u16 = SC * SNB;

/// Largest value any R,C,N,B index combination can spell.
pub const MAX_GROUP_VALUE: u32 = (SR as u32 - 1) * SCNB as u32 + (SC as u32 - 1) * SNB as u32
    + (SN as u32 - 1) * SB as u32
    + (SB as u32 - 1);

/// One of the four symbol classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolClass {
    R,
    C,
    N,
    B,
}

impl SymbolClass {
    pub const ALL: [SymbolClass; 4] = [SymbolClass::R, SymbolClass::C, SymbolClass::N, SymbolClass::B];

    /// The ordered symbols of this class.
    pub const fn symbols(self) -> &'static [char] {
        match self {
            SymbolClass::R => &R,
            SymbolClass::C => &C,
            SymbolClass::N => &N,
            SymbolClass::B => &B,
        }
    }

    /// Number of symbols (the radix of this digit position).
    pub const fn size(self) -> u16 {
        self.symbols().len() as u16
    }

    /// Symbol carrying digit `index`.
    ///
    /// Callers pass indices produced by the radix decomposition, which are
    /// always below [`size`](Self::size).
    #[inline]
    pub fn symbol(self, index: u16) -> char {
        self.symbols()[index as usize]
    }

    /// Uppercase class name, as used in listings and messages.
    pub const fn letter(self) -> char {
        match self {
            SymbolClass::R => 'R',
            SymbolClass::C => 'C',
            SymbolClass::N => 'N',
            SymbolClass::B => 'B',
        }
    }
}

impl fmt::Display for SymbolClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Reverse lookup entry: the class a character belongs to and its digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    pub class: SymbolClass,
    pub index: u16,
}

/// Every alphabet code point is below this bound.
const TABLE_SPAN: usize = 0x250;

/// Dense reverse map indexed by code point.
struct ReverseMap {
    entries: [Option<SymbolInfo>; TABLE_SPAN],
}

impl ReverseMap {
    fn build() -> Self {
        let mut entries = [None; TABLE_SPAN];
        for class in SymbolClass::ALL {
            for (index, &ch) in class.symbols().iter().enumerate() {
                entries[ch as usize] = Some(SymbolInfo {
                    class,
                    index: index as u16,
                });
            }
        }
        ReverseMap { entries }
    }
}

static REVERSE: OnceLock<ReverseMap> = OnceLock::new();

fn reverse_map() -> &'static ReverseMap {
    REVERSE.get_or_init(ReverseMap::build)
}

/// Classify a received character.
///
/// Returns `None` for characters outside all four classes.
#[inline]
pub fn lookup(ch: char) -> Option<SymbolInfo> {
    reverse_map()
        .entries
        .get(ch as usize)
        .copied()
        .flatten()
}

/// Digit of `ch` if it belongs to `class`.
#[inline]
pub fn index_in(class: SymbolClass, ch: char) -> Option<u16> {
    match lookup(ch) {
        Some(info) if info.class == class => Some(info.index),
        _ => None,
    }
}

/// Whether `ch` belongs to any class.
#[inline]
pub fn is_symbol(ch: char) -> bool {
    lookup(ch).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_class_sizes() {
        assert_eq!((SR, SC, SN, SB), (15, 15, 15, 10));
        assert_eq!(SNB, 150);
        assert_eq!(SCNB, 2250);
        assert_eq!(MAX_GROUP_VALUE, 33749);
    }

    #[test]
    fn test_classes_are_disjoint() {
        let mut seen = HashSet::new();
        for class in SymbolClass::ALL {
            for &ch in class.symbols() {
                assert!(seen.insert(ch), "{} appears twice", ch);
            }
        }
        assert_eq!(seen.len(), 55);
    }

    #[test]
    fn test_code_points_fit_table() {
        for class in SymbolClass::ALL {
            for &ch in class.symbols() {
                assert!((ch as usize) < TABLE_SPAN);
            }
        }
    }

    #[test]
    fn test_lookup_round_trip() {
        for class in SymbolClass::ALL {
            for index in 0..class.size() {
                let ch = class.symbol(index);
                assert_eq!(lookup(ch), Some(SymbolInfo { class, index }));
                assert_eq!(index_in(class, ch), Some(index));
            }
        }
    }

    #[test]
    fn test_lookup_rejects_foreign() {
        for ch in ['a', 'z', '0', ' ', '\0', 'Ȋ', '€', '🦀', '\u{10072}'] {
            assert_eq!(lookup(ch), None, "{:?}", ch);
        }
        assert_eq!(index_in(SymbolClass::C, 'r'), None);
    }

    #[test]
    fn test_class_names() {
        let names: Vec<String> = SymbolClass::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, ["R", "C", "N", "B"]);
        for class in SymbolClass::ALL {
            assert_eq!(class.to_string(), class.letter().to_string());
        }
    }
}
