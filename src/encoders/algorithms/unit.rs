//! Mixed-radix conversion of a single unit.
//!
//! A unit is two plaintext bytes (four symbols) or, at the end of a stream, a
//! single byte (two symbols). The top bit of the unit is not spent on a digit:
//! it is carried by the order in which the symbol classes appear. `R C N B`
//! means the bit is clear, `N B R C` means it is set.

use super::errors::DecodeError;
use crate::core::alphabet::{self, SB, SC, SCNB, SNB, SymbolClass};

const POLARITY_BIT: u16 = 0x8000;
const MAX_PAIR: u32 = 0x7FFF;
const MAX_BYTE: u32 = 0x7F;

/// Encode two bytes (high byte first) into four symbols.
#[inline]
pub fn encode_pair(hi: u8, lo: u8) -> [char; 4] {
    let value = u16::from_be_bytes([hi, lo]);
    let high = value & POLARITY_BIT != 0;
    let v = value & !POLARITY_BIT;

    let r = SymbolClass::R.symbol(v / SCNB);
    let c = SymbolClass::C.symbol(v % SCNB / SNB);
    let n = SymbolClass::N.symbol(v % SNB / SB);
    let b = SymbolClass::B.symbol(v % SB);

    if high { [n, b, r, c] } else { [r, c, n, b] }
}

/// Encode a trailing odd byte into two symbols.
#[inline]
pub fn encode_byte(byte: u8) -> [char; 2] {
    let value = u16::from(byte);
    if byte > 0x7F {
        let v = value & 0x7F;
        [SymbolClass::N.symbol(v / SB), SymbolClass::B.symbol(v % SB)]
    } else {
        [SymbolClass::R.symbol(value / SC), SymbolClass::C.symbol(value % SC)]
    }
}

/// Decode a four-symbol group into two bytes.
///
/// Error positions are relative to the start of the group.
pub fn decode_group(group: &[char; 4]) -> Result<[u8; 2], DecodeError> {
    let high = alphabet::index_in(SymbolClass::R, group[0]).is_none();
    let order = if high {
        [SymbolClass::N, SymbolClass::B, SymbolClass::R, SymbolClass::C]
    } else {
        [SymbolClass::R, SymbolClass::C, SymbolClass::N, SymbolClass::B]
    };

    let mut idx = [0u16; 4];
    for (position, (&class, &symbol)) in order.iter().zip(group.iter()).enumerate() {
        idx[position] = alphabet::index_in(class, symbol)
            .ok_or_else(|| DecodeError::invalid_symbol(symbol, position as u64))?;
    }

    let (r, c, n, b) = if high {
        (idx[2], idx[3], idx[0], idx[1])
    } else {
        (idx[0], idx[1], idx[2], idx[3])
    };

    let value = u32::from(r) * u32::from(SCNB)
        + u32::from(c) * u32::from(SNB)
        + u32::from(n) * u32::from(SB)
        + u32::from(b);
    if value > MAX_PAIR {
        return Err(DecodeError::out_of_range(0, value));
    }

    let mut value = value as u16;
    if high {
        value |= POLARITY_BIT;
    }
    Ok(value.to_be_bytes())
}

/// Decode a two-symbol tail into one byte.
pub fn decode_tail(tail: &[char; 2]) -> Result<u8, DecodeError> {
    let low = alphabet::index_in(SymbolClass::R, tail[0])
        .zip(alphabet::index_in(SymbolClass::C, tail[1]));
    let (high, (i0, i1)) = match low {
        Some(pair) => (false, pair),
        None => {
            let pair = alphabet::index_in(SymbolClass::N, tail[0])
                .zip(alphabet::index_in(SymbolClass::B, tail[1]))
                .ok_or_else(|| tail_error(tail))?;
            (true, pair)
        }
    };

    let result = if high {
        u32::from(i0) * u32::from(SB) + u32::from(i1)
    } else {
        u32::from(i0) * u32::from(SC) + u32::from(i1)
    };
    if result > MAX_BYTE {
        return Err(DecodeError::out_of_range(0, result));
    }

    let byte = result as u8;
    Ok(if high { byte | 0x80 } else { byte })
}

/// Blame the second symbol when the first one picked a valid orientation.
fn tail_error(tail: &[char; 2]) -> DecodeError {
    let first_ok = matches!(
        alphabet::lookup(tail[0]).map(|info| info.class),
        Some(SymbolClass::R | SymbolClass::N)
    );
    if first_ok {
        DecodeError::invalid_symbol(tail[1], 1)
    } else {
        DecodeError::invalid_symbol(tail[0], 0)
    }
}

/// Encode whole byte pairs from `input` into `out`.
///
/// `input.len()` must be even and `out` must hold `2 * input.len()` symbols.
pub(crate) fn encode_pairs(input: &[u8], out: &mut [char]) {
    for (pair, group) in input.chunks_exact(2).zip(out.chunks_exact_mut(4)) {
        group.copy_from_slice(&encode_pair(pair[0], pair[1]));
    }
}

/// Decode whole four-symbol groups from `input` into `out`.
///
/// Stops at the first bad group; error positions are relative to `input`.
pub(crate) fn decode_groups(input: &[char], out: &mut [u8]) -> Result<(), DecodeError> {
    for (i, (group, bytes)) in input
        .chunks_exact(4)
        .zip(out.chunks_exact_mut(2))
        .enumerate()
    {
        let group = [group[0], group[1], group[2], group[3]];
        let decoded = decode_group(&group).map_err(|e| e.offset_by(4 * i as u64))?;
        bytes.copy_from_slice(&decoded);
    }
    Ok(())
}
