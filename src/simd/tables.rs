//! Lookup tables and constants shared by every granule kernel.
//!
//! All tables are computed at compile time from the alphabet. Byte-wide
//! shuffles (`pshufb`, `tbl`) address 16 entries, so every table here has
//! exactly 16 slots and every class has at most 15 symbols.
//!
//! Decoding maps a code point to a digit with a multiplicative hash:
//! `bucket = (code * mul mod 2^16) >> 12`. The multipliers below are perfect
//! for their class (no two symbols share a bucket), which the tests check.
//! A bucket hit is only a candidate: kernels re-encode the candidate digit
//! and compare it with the received code point before trusting it.

use crate::core::alphabet::{B, C, N, R, SB, SCNB, SNB};

/// Plaintext bytes per granule.
pub const GRANULE_BYTES: usize = 32;
/// Two-byte units per granule.
pub const GRANULE_UNITS: usize = GRANULE_BYTES / 2;
/// Symbols per granule.
pub const GRANULE_SYMBOLS: usize = GRANULE_UNITS * 4;

/// `v / 2250 == (v * 59653) >> 27` for every `v < 32768`.
pub const DIV_SCNB_MUL: u16 = 59653;
pub const DIV_SCNB_SHIFT: u32 = 11;
/// `v / 150 == (v * 55925) >> 23` for every `v < 2250`.
pub const DIV_SNB_MUL: u16 = 55925;
pub const DIV_SNB_SHIFT: u32 = 7;
/// `v / 10 == (v * 52429) >> 19` for every `v < 150`.
pub const DIV_SB_MUL: u16 = 52429;
pub const DIV_SB_SHIFT: u32 = 3;

pub const WEIGHT_R: u16 = SCNB;
pub const WEIGHT_C: u16 = SNB;
pub const WEIGHT_N: u16 = SB;

/// Marks a hash bucket no symbol of the class lands in.
pub const NOT_FOUND: u8 = 0xFF;

/// Shift applied after the class hash multiply.
pub const HASH_SHIFT: u32 = 12;

/// Polarity hash: `(code * 2117 mod 2^16) >> 13` separates R from N.
pub const POLARITY_MUL: u16 = 2117;
pub const POLARITY_SHIFT: u32 = 13;

/// Swaps the bytes of every 16-bit lane (units are big-endian in memory).
pub const SWIZZLE: [u8; 16] = [1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13, 12, 15, 14];

/// Encode and decode tables for one symbol class.
#[derive(Debug, Clone, Copy)]
pub struct ClassTables {
    /// Symbol for each digit, padded with NUL.
    pub symbols: [char; 16],
    /// Low byte of each symbol's code point.
    pub lo: [u8; 16],
    /// High byte of each symbol's code point.
    pub hi: [u8; 16],
    /// Digit for each hash bucket, or [`NOT_FOUND`].
    pub hash: [u8; 16],
    /// Hash multiplier.
    pub mul: u16,
}

impl ClassTables {
    const fn build(class: &[char], mul: u16) -> Self {
        let mut symbols = ['\0'; 16];
        let mut lo = [0u8; 16];
        let mut hi = [0u8; 16];
        let mut hash = [NOT_FOUND; 16];
        let mut i = 0;
        while i < class.len() {
            let code = class[i] as u32 as u16;
            symbols[i] = class[i];
            lo[i] = code as u8;
            hi[i] = (code >> 8) as u8;
            hash[bucket(code, mul)] = i as u8;
            i += 1;
        }
        ClassTables {
            symbols,
            lo,
            hi,
            hash,
            mul,
        }
    }

    /// 16-bit code point of digit `index`; 0 for padding or [`NOT_FOUND`].
    #[inline]
    pub fn code(&self, index: u8) -> u16 {
        match self.lo.get(index as usize) {
            Some(&lo) => u16::from_le_bytes([lo, self.hi[index as usize]]),
            None => 0,
        }
    }

    /// Digit for `code`, or [`NOT_FOUND`] if `code` is not in this class.
    #[inline]
    pub fn index_of(&self, code: u16) -> u8 {
        let candidate = self.hash[bucket(code, self.mul)];
        if candidate != NOT_FOUND && self.code(candidate) == code {
            candidate
        } else {
            NOT_FOUND
        }
    }
}

#[inline]
const fn bucket(code: u16, mul: u16) -> usize {
    (code.wrapping_mul(mul) >> HASH_SHIFT) as usize
}

pub const R_TABLES: ClassTables = ClassTables::build(&R, 4675);
pub const C_TABLES: ClassTables = ClassTables::build(&C, 11482);
pub const N_TABLES: ClassTables = ClassTables::build(&N, 9726);
pub const B_TABLES: ClassTables = ClassTables::build(&B, 2559);

/// 0xFF in every polarity bucket an N symbol hashes to, 0 elsewhere.
///
/// Only the first 8 slots are reachable; the rest pad the table to 16 bytes.
pub const POLARITY_TABLE: [u8; 16] = {
    let mut table = [0u8; 16];
    let mut i = 0;
    while i < N.len() {
        table[polarity_bucket(N[i] as u32 as u16)] = 0xFF;
        i += 1;
    }
    table
};

#[inline]
pub const fn polarity_bucket(code: u16) -> usize {
    (code.wrapping_mul(POLARITY_MUL) >> POLARITY_SHIFT) as usize
}

/// Narrow a received symbol to 16 bits, saturating like the vector packs do.
///
/// Every alphabet code point is below U+0250, so saturated values never
/// match a table entry.
#[inline]
pub fn narrow(symbol: char) -> u16 {
    u16::try_from(symbol as u32).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alphabet::SymbolClass;

    fn tables_for(class: SymbolClass) -> &'static ClassTables {
        match class {
            SymbolClass::R => &R_TABLES,
            SymbolClass::C => &C_TABLES,
            SymbolClass::N => &N_TABLES,
            SymbolClass::B => &B_TABLES,
        }
    }

    #[test]
    fn test_reciprocals_match_division() {
        for v in 0u32..32768 {
            let q = (v * DIV_SCNB_MUL as u32) >> (16 + DIV_SCNB_SHIFT);
            assert_eq!(q, v / 2250, "v = {}", v);
        }
        for v in 0u32..2250 {
            let q = (v * DIV_SNB_MUL as u32) >> (16 + DIV_SNB_SHIFT);
            assert_eq!(q, v / 150, "v = {}", v);
        }
        for v in 0u32..150 {
            let q = (v * DIV_SB_MUL as u32) >> (16 + DIV_SB_SHIFT);
            assert_eq!(q, v / 10, "v = {}", v);
        }
    }

    #[test]
    fn test_class_hashes_are_perfect() {
        for class in SymbolClass::ALL {
            let tables = tables_for(class);
            let filled = tables.hash.iter().filter(|&&d| d != NOT_FOUND).count();
            assert_eq!(filled, class.symbols().len(), "collision in class {}", class);
        }
    }

    #[test]
    fn test_index_of_agrees_with_alphabet() {
        for class in SymbolClass::ALL {
            let tables = tables_for(class);
            for code in 0..=u16::MAX {
                let expected = char::from_u32(code as u32)
                    .and_then(|ch| crate::core::alphabet::index_in(class, ch))
                    .map(|i| i as u8)
                    .unwrap_or(NOT_FOUND);
                assert_eq!(tables.index_of(code), expected, "class {} code {:#x}", class, code);
            }
        }
    }

    #[test]
    fn test_code_tables() {
        for class in SymbolClass::ALL {
            let tables = tables_for(class);
            for (i, &ch) in class.symbols().iter().enumerate() {
                assert_eq!(tables.code(i as u8), ch as u32 as u16);
                assert_eq!(tables.symbols[i], ch);
            }
            assert_eq!(tables.code(NOT_FOUND), 0);
        }
    }

    #[test]
    fn test_polarity_table_separates_r_from_n() {
        for &ch in &R {
            assert_eq!(POLARITY_TABLE[polarity_bucket(ch as u32 as u16)], 0, "{}", ch);
        }
        for &ch in &N {
            assert_eq!(POLARITY_TABLE[polarity_bucket(ch as u32 as u16)], 0xFF, "{}", ch);
        }
    }

    #[test]
    fn test_narrow_saturates() {
        assert_eq!(narrow('r'), 0x72);
        assert_eq!(narrow('\u{FFFF}'), 0xFFFF);
        assert_eq!(narrow('\u{10072}'), 0xFFFF);
    }
}
