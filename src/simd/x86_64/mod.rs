//! x86_64 SIMD implementations
//!
//! Safe entry points for the SSSE3 granule kernel. Both fall back to the
//! portable kernel when the CPU lacks SSSE3, so they are sound to call from
//! anywhere.

mod ssse3;

use crate::simd::{GRANULE_BYTES, GRANULE_SYMBOLS, generic, has_ssse3};

/// Encode whole granules. `out` must hold exactly `2 * input.len()` symbols.
pub fn encode_granules(input: &[u8], out: &mut [char]) {
    if !has_ssse3() {
        return generic::encode_granules(input, out);
    }
    // SAFETY: SSSE3 support verified above
    unsafe { ssse3::encode_granules(input, out) }
}

/// Decode one granule; `false` if any group in it is invalid.
pub fn decode_granule(input: &[char], out: &mut [u8]) -> bool {
    if !has_ssse3() {
        return generic::decode_granule(input, out);
    }
    let (input, out) = (&input[..GRANULE_SYMBOLS], &mut out[..GRANULE_BYTES]);
    // SAFETY: SSSE3 support verified above, slice lengths checked by indexing
    unsafe { ssse3::decode_granule(input, out) }
}
