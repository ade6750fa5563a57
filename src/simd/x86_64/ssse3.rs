//! SSSE3 granule kernel
//!
//! Each half-granule (16 bytes, 8 units) fits one `__m128i` of 16-bit lanes.
//! Digits come from `pmulhuw` reciprocals; symbols come from two `pshufb`
//! lookups (low and high code byte). Decoding runs the lookups backwards
//! through the perfect-hash tables and verifies each candidate by looking its
//! code point up again.

// Intrinsics are wrapped in explicit unsafe blocks for the 2024 edition
// unsafe_op_in_unsafe_fn lint; some of them are already safe to call here.
#![allow(unused_unsafe)]

use std::arch::x86_64::*;

use crate::simd::tables::{
    B_TABLES, C_TABLES, ClassTables, DIV_SB_MUL, DIV_SB_SHIFT, DIV_SCNB_MUL, DIV_SCNB_SHIFT,
    DIV_SNB_MUL, DIV_SNB_SHIFT, GRANULE_BYTES, GRANULE_SYMBOLS, HASH_SHIFT, N_TABLES,
    NOT_FOUND, POLARITY_MUL, POLARITY_SHIFT, POLARITY_TABLE, R_TABLES, SWIZZLE, WEIGHT_C,
    WEIGHT_N, WEIGHT_R,
};

/// Class tables loaded into registers.
#[derive(Clone, Copy)]
struct ClassVectors {
    lo: __m128i,
    hi: __m128i,
    hash: __m128i,
    mul: __m128i,
}

#[target_feature(enable = "ssse3")]
unsafe fn load_table(table: &[u8; 16]) -> __m128i {
    unsafe { _mm_loadu_si128(table.as_ptr() as *const __m128i) }
}

#[target_feature(enable = "ssse3")]
unsafe fn load_class(tables: &ClassTables) -> ClassVectors {
    unsafe {
        ClassVectors {
            lo: load_table(&tables.lo),
            hi: load_table(&tables.hi),
            hash: load_table(&tables.hash),
            mul: _mm_set1_epi16(tables.mul as i16),
        }
    }
}

/// Look up a 16-entry byte table with 16-bit lane indices.
///
/// Indices above 15 (including [`NOT_FOUND`]) yield 0. Bit 7 set in an index
/// byte makes `pshufb` return zero, so lanes come back zero-extended.
#[target_feature(enable = "ssse3")]
unsafe fn lookup16(table: __m128i, index: __m128i) -> __m128i {
    unsafe {
        let clamped = _mm_or_si128(index, _mm_cmpgt_epi16(index, _mm_set1_epi16(15)));
        _mm_shuffle_epi8(table, _mm_or_si128(clamped, _mm_set1_epi16(0x8000u16 as i16)))
    }
}

/// Code points of the symbols for `digits`.
#[target_feature(enable = "ssse3")]
unsafe fn codes(class: &ClassVectors, digits: __m128i) -> __m128i {
    unsafe {
        let lo = lookup16(class.lo, digits);
        let hi = lookup16(class.hi, digits);
        _mm_or_si128(lo, _mm_slli_epi16(hi, 8))
    }
}

/// `mask ? set : clear`, lane-wise.
#[target_feature(enable = "ssse3")]
unsafe fn select(mask: __m128i, set: __m128i, clear: __m128i) -> __m128i {
    unsafe { _mm_or_si128(_mm_and_si128(mask, set), _mm_andnot_si128(mask, clear)) }
}

/// Encode whole granules. `out` must hold exactly `2 * input.len()` symbols.
///
/// # Safety
/// The CPU must support SSSE3.
#[target_feature(enable = "ssse3")]
pub unsafe fn encode_granules(input: &[u8], out: &mut [char]) {
    debug_assert_eq!(input.len() % GRANULE_BYTES, 0);
    debug_assert_eq!(out.len(), 2 * input.len());

    unsafe {
        let swizzle = load_table(&SWIZZLE);
        let classes = [
            load_class(&R_TABLES),
            load_class(&C_TABLES),
            load_class(&N_TABLES),
            load_class(&B_TABLES),
        ];

        for (granule, symbols) in input
            .chunks_exact(GRANULE_BYTES)
            .zip(out.chunks_exact_mut(GRANULE_SYMBOLS))
        {
            for half in 0..2 {
                let src = granule.as_ptr().add(16 * half) as *const __m128i;
                let dst = symbols.as_mut_ptr().add(32 * half) as *mut __m128i;
                encode_half(src, dst, swizzle, &classes);
            }
        }
    }
}

/// Encode 16 bytes at `src` into 32 symbols at `dst`.
#[target_feature(enable = "ssse3")]
unsafe fn encode_half(
    src: *const __m128i,
    dst: *mut __m128i,
    swizzle: __m128i,
    classes: &[ClassVectors; 4],
) {
    unsafe {
        let units = _mm_shuffle_epi8(_mm_loadu_si128(src), swizzle);
        let sign = _mm_srai_epi16(units, 15);
        let v = _mm_and_si128(units, _mm_set1_epi16(0x7FFF));

        let r = _mm_srli_epi16::<{ DIV_SCNB_SHIFT as i32 }>(_mm_mulhi_epu16(
            v,
            _mm_set1_epi16(DIV_SCNB_MUL as i16),
        ));
        let rem = _mm_sub_epi16(v, _mm_mullo_epi16(r, _mm_set1_epi16(WEIGHT_R as i16)));
        let c = _mm_srli_epi16::<{ DIV_SNB_SHIFT as i32 }>(_mm_mulhi_epu16(
            rem,
            _mm_set1_epi16(DIV_SNB_MUL as i16),
        ));
        let rem = _mm_sub_epi16(rem, _mm_mullo_epi16(c, _mm_set1_epi16(WEIGHT_C as i16)));
        let n = _mm_srli_epi16::<{ DIV_SB_SHIFT as i32 }>(_mm_mulhi_epu16(
            rem,
            _mm_set1_epi16(DIV_SB_MUL as i16),
        ));
        let b = _mm_sub_epi16(rem, _mm_mullo_epi16(n, _mm_set1_epi16(WEIGHT_N as i16)));

        let rc = codes(&classes[0], r);
        let cc = codes(&classes[1], c);
        let nc = codes(&classes[2], n);
        let bc = codes(&classes[3], b);

        let p0 = select(sign, nc, rc);
        let p1 = select(sign, bc, cc);
        let p2 = select(sign, rc, nc);
        let p3 = select(sign, cc, bc);

        // 16-bit transpose: four position vectors into eight unit-ordered groups
        let a_lo = _mm_unpacklo_epi16(p0, p1);
        let a_hi = _mm_unpackhi_epi16(p0, p1);
        let b_lo = _mm_unpacklo_epi16(p2, p3);
        let b_hi = _mm_unpackhi_epi16(p2, p3);
        let groups = [
            _mm_unpacklo_epi32(a_lo, b_lo),
            _mm_unpackhi_epi32(a_lo, b_lo),
            _mm_unpacklo_epi32(a_hi, b_hi),
            _mm_unpackhi_epi32(a_hi, b_hi),
        ];

        // Zero-extend to 32-bit lanes. Every lane is a table code point, so
        // the stored words are valid `char`s.
        let zero = _mm_setzero_si128();
        for (k, &group) in groups.iter().enumerate() {
            _mm_storeu_si128(dst.add(2 * k), _mm_unpacklo_epi16(group, zero));
            _mm_storeu_si128(dst.add(2 * k + 1), _mm_unpackhi_epi16(group, zero));
        }
    }
}

/// Decode one granule of exactly [`GRANULE_SYMBOLS`] symbols.
///
/// Returns `false` and leaves `out` untouched if any group is invalid.
///
/// # Safety
/// The CPU must support SSSE3. `input` must hold at least [`GRANULE_SYMBOLS`]
/// symbols and `out` at least [`GRANULE_BYTES`] bytes.
#[target_feature(enable = "ssse3")]
pub unsafe fn decode_granule(input: &[char], out: &mut [u8]) -> bool {
    debug_assert!(input.len() >= GRANULE_SYMBOLS && out.len() >= GRANULE_BYTES);

    unsafe {
        let swizzle = load_table(&SWIZZLE);
        let classes = [
            load_class(&R_TABLES),
            load_class(&C_TABLES),
            load_class(&N_TABLES),
            load_class(&B_TABLES),
        ];

        let mut bad = _mm_setzero_si128();
        let mut halves = [_mm_setzero_si128(); 2];
        for (half, result) in halves.iter_mut().enumerate() {
            let src = input.as_ptr().add(32 * half) as *const __m128i;
            *result = decode_half(src, swizzle, &classes, &mut bad);
        }

        if _mm_movemask_epi8(bad) != 0 {
            return false;
        }
        let dst = out.as_mut_ptr() as *mut __m128i;
        _mm_storeu_si128(dst, halves[0]);
        _mm_storeu_si128(dst.add(1), halves[1]);
        true
    }
}

/// Decode 32 symbols at `src` into 16 big-endian bytes, accumulating
/// failures into `bad`.
#[target_feature(enable = "ssse3")]
unsafe fn decode_half(
    src: *const __m128i,
    swizzle: __m128i,
    classes: &[ClassVectors; 4],
    bad: &mut __m128i,
) -> __m128i {
    unsafe {
        // Signed saturation maps code points above U+7FFF to 0x7FFF, which
        // is not in any class.
        let g01 = _mm_packs_epi32(_mm_loadu_si128(src), _mm_loadu_si128(src.add(1)));
        let g23 = _mm_packs_epi32(_mm_loadu_si128(src.add(2)), _mm_loadu_si128(src.add(3)));
        let g45 = _mm_packs_epi32(_mm_loadu_si128(src.add(4)), _mm_loadu_si128(src.add(5)));
        let g67 = _mm_packs_epi32(_mm_loadu_si128(src.add(6)), _mm_loadu_si128(src.add(7)));

        // Transpose unit-ordered groups into per-position vectors
        let t0 = _mm_unpacklo_epi16(g01, g23);
        let t1 = _mm_unpackhi_epi16(g01, g23);
        let t2 = _mm_unpacklo_epi16(g45, g67);
        let t3 = _mm_unpackhi_epi16(g45, g67);
        let u0 = _mm_unpacklo_epi16(t0, t1);
        let u1 = _mm_unpackhi_epi16(t0, t1);
        let u2 = _mm_unpacklo_epi16(t2, t3);
        let u3 = _mm_unpackhi_epi16(t2, t3);
        let p0 = _mm_unpacklo_epi64(u0, u2);
        let p1 = _mm_unpackhi_epi64(u0, u2);
        let p2 = _mm_unpacklo_epi64(u1, u3);
        let p3 = _mm_unpackhi_epi64(u1, u3);

        let bucket = _mm_srli_epi16::<{ POLARITY_SHIFT as i32 }>(_mm_mullo_epi16(
            p0,
            _mm_set1_epi16(POLARITY_MUL as i16),
        ));
        let sign = _mm_cmpeq_epi16(
            lookup16(load_table(&POLARITY_TABLE), bucket),
            _mm_set1_epi16(0xFF),
        );

        let r = class_index(&classes[0], select(sign, p2, p0), bad);
        let c = class_index(&classes[1], select(sign, p3, p1), bad);
        let n = class_index(&classes[2], select(sign, p0, p2), bad);
        let b = class_index(&classes[3], select(sign, p1, p3), bad);

        let value = _mm_add_epi16(
            _mm_add_epi16(
                _mm_mullo_epi16(r, _mm_set1_epi16(WEIGHT_R as i16)),
                _mm_mullo_epi16(c, _mm_set1_epi16(WEIGHT_C as i16)),
            ),
            _mm_add_epi16(_mm_mullo_epi16(n, _mm_set1_epi16(WEIGHT_N as i16)), b),
        );
        *bad = _mm_or_si128(*bad, _mm_srai_epi16(value, 15));

        let units = _mm_or_si128(value, _mm_and_si128(sign, _mm_set1_epi16(0x8000u16 as i16)));
        _mm_shuffle_epi8(units, swizzle)
    }
}

/// Digits for `code`, flagging lanes whose code is not in the class.
#[target_feature(enable = "ssse3")]
unsafe fn class_index(class: &ClassVectors, code: __m128i, bad: &mut __m128i) -> __m128i {
    unsafe {
        let bucket =
            _mm_srli_epi16::<{ HASH_SHIFT as i32 }>(_mm_mullo_epi16(code, class.mul));
        let index = lookup16(class.hash, bucket);
        let missing = _mm_cmpeq_epi16(index, _mm_set1_epi16(NOT_FOUND as i16));
        let matches = _mm_cmpeq_epi16(codes(class, index), code);
        let mismatch = _mm_cmpeq_epi16(matches, _mm_setzero_si128());
        *bad = _mm_or_si128(*bad, _mm_or_si128(missing, mismatch));
        index
    }
}
