//! NEON granule kernel
//!
//! Works on a whole granule at once: arithmetic runs on two `uint16x8_t`
//! halves, table lookups run on one `uint8x16_t` of narrowed indices through
//! `tbl`. Interleaving and deinterleaving the four symbol positions is done by
//! the structured `ld4`/`st4` loads and stores.

// Allow unused_unsafe because we explicitly wrap NEON intrinsics for Rust 2024
// edition compatibility (unsafe_op_in_unsafe_fn lint).
#![allow(unused_unsafe)]

use std::arch::aarch64::*;

use crate::simd::tables::{
    B_TABLES, C_TABLES, ClassTables, DIV_SB_MUL, DIV_SB_SHIFT, DIV_SCNB_MUL, DIV_SCNB_SHIFT,
    DIV_SNB_MUL, DIV_SNB_SHIFT, GRANULE_BYTES, GRANULE_SYMBOLS, HASH_SHIFT, N_TABLES,
    NOT_FOUND, POLARITY_MUL, POLARITY_SHIFT, POLARITY_TABLE, R_TABLES, WEIGHT_C, WEIGHT_N,
    WEIGHT_R,
};

type Halves = [uint16x8_t; 2];

#[derive(Clone, Copy)]
struct ClassVectors {
    lo: uint8x16_t,
    hi: uint8x16_t,
    hash: uint8x16_t,
    mul: u16,
}

#[target_feature(enable = "neon")]
unsafe fn load_class(tables: &ClassTables) -> ClassVectors {
    unsafe {
        ClassVectors {
            lo: vld1q_u8(tables.lo.as_ptr()),
            hi: vld1q_u8(tables.hi.as_ptr()),
            hash: vld1q_u8(tables.hash.as_ptr()),
            mul: tables.mul,
        }
    }
}

#[target_feature(enable = "neon")]
unsafe fn load_classes() -> [ClassVectors; 4] {
    unsafe {
        [
            load_class(&R_TABLES),
            load_class(&C_TABLES),
            load_class(&N_TABLES),
            load_class(&B_TABLES),
        ]
    }
}

/// High 16 bits of `v * k`, lane-wise.
#[target_feature(enable = "neon")]
unsafe fn mulhi(v: uint16x8_t, k: u16) -> uint16x8_t {
    unsafe {
        let lo = vmull_n_u16(vget_low_u16(v), k);
        let hi = vmull_high_n_u16(v, k);
        vuzp2q_u16(vreinterpretq_u16_u32(lo), vreinterpretq_u16_u32(hi))
    }
}

/// Pack two halves of small lane values into one byte vector.
#[target_feature(enable = "neon")]
unsafe fn narrow(v: Halves) -> uint8x16_t {
    unsafe { vmovn_high_u16(vmovn_u16(v[0]), v[1]) }
}

#[target_feature(enable = "neon")]
unsafe fn widen(v: uint8x16_t) -> Halves {
    unsafe { [vmovl_u8(vget_low_u8(v)), vmovl_high_u8(v)] }
}

/// Code points for byte indices; indices above 15 give 0.
#[target_feature(enable = "neon")]
unsafe fn codes(class: &ClassVectors, index: uint8x16_t) -> Halves {
    unsafe {
        let lo = vqtbl1q_u8(class.lo, index);
        let hi = vqtbl1q_u8(class.hi, index);
        [
            vreinterpretq_u16_u8(vzip1q_u8(lo, hi)),
            vreinterpretq_u16_u8(vzip2q_u8(lo, hi)),
        ]
    }
}

#[target_feature(enable = "neon")]
unsafe fn select(mask: &Halves, set: Halves, clear: Halves) -> Halves {
    unsafe {
        [
            vbslq_u16(mask[0], set[0], clear[0]),
            vbslq_u16(mask[1], set[1], clear[1]),
        ]
    }
}

/// Encode whole granules. `out` must hold exactly `2 * input.len()` symbols.
///
/// # Safety
/// The CPU must support NEON.
#[target_feature(enable = "neon")]
pub unsafe fn encode_granules(input: &[u8], out: &mut [char]) {
    debug_assert_eq!(input.len() % GRANULE_BYTES, 0);
    debug_assert_eq!(out.len(), 2 * input.len());

    unsafe {
        let classes = load_classes();
        for (granule, symbols) in input
            .chunks_exact(GRANULE_BYTES)
            .zip(out.chunks_exact_mut(GRANULE_SYMBOLS))
        {
            encode_granule(granule.as_ptr(), symbols.as_mut_ptr() as *mut u32, &classes);
        }
    }
}

#[target_feature(enable = "neon")]
unsafe fn encode_granule(src: *const u8, dst: *mut u32, classes: &[ClassVectors; 4]) {
    unsafe {
        let zero = vdupq_n_u16(0);
        let mut sign = [zero; 2];
        let mut digits = [[zero; 2]; 4];
        for half in 0..2 {
            let units = vreinterpretq_u16_u8(vrev16q_u8(vld1q_u8(src.add(16 * half))));
            sign[half] = vreinterpretq_u16_s16(vshrq_n_s16::<15>(vreinterpretq_s16_u16(units)));
            let v = vandq_u16(units, vdupq_n_u16(0x7FFF));

            let r = vshrq_n_u16::<{ DIV_SCNB_SHIFT as i32 }>(mulhi(v, DIV_SCNB_MUL));
            let rem = vmlsq_n_u16(v, r, WEIGHT_R);
            let c = vshrq_n_u16::<{ DIV_SNB_SHIFT as i32 }>(mulhi(rem, DIV_SNB_MUL));
            let rem = vmlsq_n_u16(rem, c, WEIGHT_C);
            let n = vshrq_n_u16::<{ DIV_SB_SHIFT as i32 }>(mulhi(rem, DIV_SB_MUL));
            let b = vmlsq_n_u16(rem, n, WEIGHT_N);

            digits[0][half] = r;
            digits[1][half] = c;
            digits[2][half] = n;
            digits[3][half] = b;
        }

        let rc = codes(&classes[0], narrow(digits[0]));
        let cc = codes(&classes[1], narrow(digits[1]));
        let nc = codes(&classes[2], narrow(digits[2]));
        let bc = codes(&classes[3], narrow(digits[3]));

        let p0 = select(&sign, nc, rc);
        let p1 = select(&sign, bc, cc);
        let p2 = select(&sign, rc, nc);
        let p3 = select(&sign, cc, bc);

        // st4 interleaves the positions back into groups; every lane is a
        // table code point, so the stored words are valid `char`s.
        for half in 0..2 {
            let base = dst.add(32 * half);
            vst4q_u32(
                base,
                uint32x4x4_t(
                    vmovl_u16(vget_low_u16(p0[half])),
                    vmovl_u16(vget_low_u16(p1[half])),
                    vmovl_u16(vget_low_u16(p2[half])),
                    vmovl_u16(vget_low_u16(p3[half])),
                ),
            );
            vst4q_u32(
                base.add(16),
                uint32x4x4_t(
                    vmovl_high_u16(p0[half]),
                    vmovl_high_u16(p1[half]),
                    vmovl_high_u16(p2[half]),
                    vmovl_high_u16(p3[half]),
                ),
            );
        }
    }
}

/// Decode one granule of exactly [`GRANULE_SYMBOLS`] symbols.
///
/// Returns `false` and leaves `out` untouched if any group is invalid.
///
/// # Safety
/// The CPU must support NEON. `input` must hold at least [`GRANULE_SYMBOLS`]
/// symbols and `out` at least [`GRANULE_BYTES`] bytes.
#[target_feature(enable = "neon")]
pub unsafe fn decode_granule(input: &[char], out: &mut [u8]) -> bool {
    debug_assert!(input.len() >= GRANULE_SYMBOLS && out.len() >= GRANULE_BYTES);

    unsafe {
        let classes = load_classes();
        let src = input.as_ptr() as *const u32;

        // Saturating narrow maps code points above U+FFFF to 0xFFFF, which is
        // not in any class.
        let zero = vdupq_n_u16(0);
        let mut pos = [[zero; 2]; 4];
        for half in 0..2 {
            let first = vld4q_u32(src.add(32 * half));
            let second = vld4q_u32(src.add(32 * half + 16));
            pos[0][half] = vcombine_u16(vqmovn_u32(first.0), vqmovn_u32(second.0));
            pos[1][half] = vcombine_u16(vqmovn_u32(first.1), vqmovn_u32(second.1));
            pos[2][half] = vcombine_u16(vqmovn_u32(first.2), vqmovn_u32(second.2));
            pos[3][half] = vcombine_u16(vqmovn_u32(first.3), vqmovn_u32(second.3));
        }

        let buckets = [
            vshrq_n_u16::<{ POLARITY_SHIFT as i32 }>(vmulq_n_u16(pos[0][0], POLARITY_MUL)),
            vshrq_n_u16::<{ POLARITY_SHIFT as i32 }>(vmulq_n_u16(pos[0][1], POLARITY_MUL)),
        ];
        let polarity = widen(vqtbl1q_u8(vld1q_u8(POLARITY_TABLE.as_ptr()), narrow(buckets)));
        let all_n = vdupq_n_u16(0xFF);
        let sign = [vceqq_u16(polarity[0], all_n), vceqq_u16(polarity[1], all_n)];

        let mut bad8 = vdupq_n_u8(0);
        let mut bad16 = zero;
        let r = class_index(&classes[0], select(&sign, pos[2], pos[0]), &mut bad8, &mut bad16);
        let c = class_index(&classes[1], select(&sign, pos[3], pos[1]), &mut bad8, &mut bad16);
        let n = class_index(&classes[2], select(&sign, pos[0], pos[2]), &mut bad8, &mut bad16);
        let b = class_index(&classes[3], select(&sign, pos[1], pos[3]), &mut bad8, &mut bad16);

        let mut bytes = [vdupq_n_u8(0); 2];
        for half in 0..2 {
            let value = vmlaq_n_u16(
                vmlaq_n_u16(vmlaq_n_u16(b[half], n[half], WEIGHT_N), c[half], WEIGHT_C),
                r[half],
                WEIGHT_R,
            );
            bad16 = vorrq_u16(bad16, vcgtq_u16(value, vdupq_n_u16(0x7FFF)));
            let units = vorrq_u16(value, vandq_u16(sign[half], vdupq_n_u16(0x8000)));
            bytes[half] = vrev16q_u8(vreinterpretq_u8_u16(units));
        }

        if vmaxvq_u8(bad8) != 0 || vmaxvq_u16(bad16) != 0 {
            return false;
        }
        vst1q_u8(out.as_mut_ptr(), bytes[0]);
        vst1q_u8(out.as_mut_ptr().add(16), bytes[1]);
        true
    }
}

/// Digits for `code`, flagging lanes whose code is not in the class.
#[target_feature(enable = "neon")]
unsafe fn class_index(
    class: &ClassVectors,
    code: Halves,
    bad8: &mut uint8x16_t,
    bad16: &mut uint16x8_t,
) -> Halves {
    unsafe {
        let buckets = [
            vshrq_n_u16::<{ HASH_SHIFT as i32 }>(vmulq_n_u16(code[0], class.mul)),
            vshrq_n_u16::<{ HASH_SHIFT as i32 }>(vmulq_n_u16(code[1], class.mul)),
        ];
        let index = vqtbl1q_u8(class.hash, narrow(buckets));
        *bad8 = vorrq_u8(*bad8, vceqq_u8(index, vdupq_n_u8(NOT_FOUND)));

        let expected = codes(class, index);
        for half in 0..2 {
            *bad16 = vorrq_u16(*bad16, vmvnq_u16(vceqq_u16(expected[half], code[half])));
        }
        widen(index)
    }
}
