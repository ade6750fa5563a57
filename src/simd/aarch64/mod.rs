//! aarch64 SIMD implementations
//!
//! NEON is part of the aarch64 baseline, so these entry points call the
//! kernel directly.

mod neon;

use crate::simd::{GRANULE_BYTES, GRANULE_SYMBOLS};

/// Encode whole granules. `out` must hold exactly `2 * input.len()` symbols.
pub fn encode_granules(input: &[u8], out: &mut [char]) {
    // SAFETY: NEON is mandatory on aarch64
    unsafe { neon::encode_granules(input, out) }
}

/// Decode one granule; `false` if any group in it is invalid.
pub fn decode_granule(input: &[char], out: &mut [u8]) -> bool {
    let (input, out) = (&input[..GRANULE_SYMBOLS], &mut out[..GRANULE_BYTES]);
    // SAFETY: NEON is mandatory on aarch64, slice lengths checked by indexing
    unsafe { neon::decode_granule(input, out) }
}
