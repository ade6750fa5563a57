//! Portable granule kernel
//!
//! Runs the same lane program as the vector kernels over plain `[u16; 16]`
//! arrays: reciprocal multiplies instead of division, table lookups instead
//! of searches, and masks instead of branches. It is always available and
//! gives every platform a bulk path the compiler can auto-vectorize.

use crate::simd::tables::{
    B_TABLES, C_TABLES, ClassTables, DIV_SB_MUL, DIV_SB_SHIFT, DIV_SCNB_MUL, DIV_SCNB_SHIFT,
    DIV_SNB_MUL, DIV_SNB_SHIFT, GRANULE_BYTES, GRANULE_SYMBOLS, GRANULE_UNITS, N_TABLES,
    NOT_FOUND, POLARITY_TABLE, R_TABLES, WEIGHT_C, WEIGHT_N, WEIGHT_R, narrow, polarity_bucket,
};

type Lanes = [u16; GRANULE_UNITS];

#[inline(always)]
fn mulhi(a: u16, b: u16) -> u16 {
    ((u32::from(a) * u32::from(b)) >> 16) as u16
}

#[inline(always)]
fn select(mask: u16, set: u16, clear: u16) -> u16 {
    (mask & set) | (!mask & clear)
}

/// Encode whole granules. `out` must hold exactly `2 * input.len()` symbols.
pub fn encode_granules(input: &[u8], out: &mut [char]) {
    debug_assert_eq!(input.len() % GRANULE_BYTES, 0);
    debug_assert_eq!(out.len(), 2 * input.len());

    for (granule, symbols) in input
        .chunks_exact(GRANULE_BYTES)
        .zip(out.chunks_exact_mut(GRANULE_SYMBOLS))
    {
        encode_granule(granule, symbols);
    }
}

fn encode_granule(input: &[u8], out: &mut [char]) {
    let mut sign: Lanes = [0; GRANULE_UNITS];
    let mut value: Lanes = [0; GRANULE_UNITS];
    for (i, pair) in input.chunks_exact(2).enumerate() {
        let x = u16::from_be_bytes([pair[0], pair[1]]);
        sign[i] = ((x as i16) >> 15) as u16;
        value[i] = x & 0x7FFF;
    }

    let mut digits = [[0u16; GRANULE_UNITS]; 4];
    for i in 0..GRANULE_UNITS {
        let v = value[i];
        let r = mulhi(v, DIV_SCNB_MUL) >> DIV_SCNB_SHIFT;
        let rem = v - r * WEIGHT_R;
        let c = mulhi(rem, DIV_SNB_MUL) >> DIV_SNB_SHIFT;
        let rem = rem - c * WEIGHT_C;
        let n = mulhi(rem, DIV_SB_MUL) >> DIV_SB_SHIFT;
        let b = rem - n * WEIGHT_N;
        digits[0][i] = r;
        digits[1][i] = c;
        digits[2][i] = n;
        digits[3][i] = b;
    }

    for (i, group) in out.chunks_exact_mut(4).enumerate() {
        let symbols = [
            R_TABLES.symbols[digits[0][i] as usize],
            C_TABLES.symbols[digits[1][i] as usize],
            N_TABLES.symbols[digits[2][i] as usize],
            B_TABLES.symbols[digits[3][i] as usize],
        ];
        // Sign lanes are all-ones or all-zeros.
        if sign[i] != 0 {
            group.copy_from_slice(&[symbols[2], symbols[3], symbols[0], symbols[1]]);
        } else {
            group.copy_from_slice(&symbols);
        }
    }
}

/// Decode one granule of exactly [`GRANULE_SYMBOLS`] symbols into
/// [`GRANULE_BYTES`] bytes.
///
/// Returns `false` and leaves `out` untouched if any group in the granule is
/// invalid; the caller re-decodes the granule with the scalar path.
pub fn decode_granule(input: &[char], out: &mut [u8]) -> bool {
    debug_assert_eq!(input.len(), GRANULE_SYMBOLS);
    debug_assert_eq!(out.len(), GRANULE_BYTES);

    let mut pos = [[0u16; GRANULE_UNITS]; 4];
    for (i, group) in input.chunks_exact(4).enumerate() {
        for (k, &symbol) in group.iter().enumerate() {
            pos[k][i] = narrow(symbol);
        }
    }

    let mut bad = 0u16;
    let mut bytes = [0u8; GRANULE_BYTES];
    for i in 0..GRANULE_UNITS {
        let sign = if POLARITY_TABLE[polarity_bucket(pos[0][i])] == 0xFF { 0xFFFF } else { 0 };

        let r = lane_index(&R_TABLES, select(sign, pos[2][i], pos[0][i]), &mut bad);
        let c = lane_index(&C_TABLES, select(sign, pos[3][i], pos[1][i]), &mut bad);
        let n = lane_index(&N_TABLES, select(sign, pos[0][i], pos[2][i]), &mut bad);
        let b = lane_index(&B_TABLES, select(sign, pos[1][i], pos[3][i]), &mut bad);

        let value = r
            .wrapping_mul(WEIGHT_R)
            .wrapping_add(c.wrapping_mul(WEIGHT_C))
            .wrapping_add(n.wrapping_mul(WEIGHT_N))
            .wrapping_add(b);
        bad |= value & 0x8000;

        let unit = value | (sign & 0x8000);
        bytes[2 * i..2 * i + 2].copy_from_slice(&unit.to_be_bytes());
    }

    if bad != 0 {
        return false;
    }
    out.copy_from_slice(&bytes);
    true
}

#[inline(always)]
fn lane_index(tables: &ClassTables, code: u16, bad: &mut u16) -> u16 {
    let index = tables.index_of(code);
    if index == NOT_FOUND {
        *bad |= 1;
        0
    } else {
        u16::from(index)
    }
}
