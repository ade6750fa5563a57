//! Granule kernels and backend selection
//!
//! A granule is 32 plaintext bytes (16 units, 64 symbols). The streaming
//! state machine hands whole granules to a [`Backend`] and runs the scalar
//! unit codec on whatever is left over. Every backend produces output
//! identical to the scalar path; a vector decode that meets an invalid group
//! rejects the whole granule, which is then re-decoded by the scalar path so
//! the reported error is exact.
//!
//! Runtime CPU feature detection picks the fastest available backend.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::encoders::algorithms::{DecodeError, unit};

pub mod generic;
pub mod tables;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod x86_64;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
mod aarch64;

pub use tables::{GRANULE_BYTES, GRANULE_SYMBOLS, GRANULE_UNITS};

// CPU feature detection cache
#[cfg(target_arch = "x86_64")]
static HAS_SSSE3: OnceLock<bool> = OnceLock::new();

static DETECTED: OnceLock<Backend> = OnceLock::new();

/// Check if SSSE3 is available (cached after first call)
#[cfg(target_arch = "x86_64")]
pub fn has_ssse3() -> bool {
    *HAS_SSSE3.get_or_init(|| is_x86_feature_detected!("ssse3"))
}

#[cfg(not(target_arch = "x86_64"))]
pub fn has_ssse3() -> bool {
    false
}

/// Check if NEON is available (mandatory on aarch64)
pub fn has_neon() -> bool {
    cfg!(target_arch = "aarch64")
}

/// Calculate number of full granules and the bytes (or symbols) they cover
///
/// Returns (num_granules, processed)
#[inline(always)]
pub fn calculate_granules(len: usize, granule_size: usize) -> (usize, usize) {
    let count = len / granule_size;
    (count, count * granule_size)
}

/// Bulk transform implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Unit-at-a-time reference codec
    Scalar,
    /// Fixed-width lane arrays, available everywhere
    Portable,
    /// 128-bit SSSE3 kernel (x86_64)
    Ssse3,
    /// 128-bit NEON kernel (aarch64)
    Neon,
}

impl Backend {
    pub const ALL: [Backend; 4] = [
        Backend::Scalar,
        Backend::Portable,
        Backend::Ssse3,
        Backend::Neon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Scalar => "scalar",
            Backend::Portable => "portable",
            Backend::Ssse3 => "ssse3",
            Backend::Neon => "neon",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Backend::Scalar => "one unit at a time, no lookup tables",
            Backend::Portable => "16-lane arrays with reciprocal division",
            Backend::Ssse3 => "x86_64 pshufb lookups and pmulhuw reciprocals",
            Backend::Neon => "aarch64 tbl lookups with ld4/st4 interleaving",
        }
    }

    /// Whether this build and CPU can run the backend natively.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Scalar | Backend::Portable => true,
            Backend::Ssse3 => cfg!(feature = "simd") && has_ssse3(),
            Backend::Neon => cfg!(feature = "simd") && has_neon(),
        }
    }

    /// Fastest available backend (cached after first call).
    pub fn detect() -> Backend {
        *DETECTED.get_or_init(|| {
            [Backend::Ssse3, Backend::Neon]
                .into_iter()
                .find(|backend| backend.is_available())
                .unwrap_or(Backend::Portable)
        })
    }

    /// This backend if available, otherwise [`Backend::Portable`].
    pub fn resolve(self) -> Backend {
        if self.is_available() {
            self
        } else {
            Backend::Portable
        }
    }

    /// Encode whole granules.
    ///
    /// `input.len()` must be a multiple of [`GRANULE_BYTES`] and `out` must
    /// hold exactly `2 * input.len()` symbols.
    pub fn encode_granules(self, input: &[u8], out: &mut [char]) {
        debug_assert_eq!(input.len() % GRANULE_BYTES, 0);
        debug_assert_eq!(out.len(), 2 * input.len());

        match self.resolve() {
            Backend::Scalar => unit::encode_pairs(input, out),
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Backend::Ssse3 => x86_64::encode_granules(input, out),
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            Backend::Neon => aarch64::encode_granules(input, out),
            _ => generic::encode_granules(input, out),
        }
    }

    /// Decode whole granules.
    ///
    /// `input.len()` must be a multiple of [`GRANULE_SYMBOLS`] and `out` must
    /// hold exactly `input.len() / 2` bytes. Error positions are relative to
    /// `input`. On error, granules before the failing one are fully written.
    pub fn decode_granules(self, input: &[char], out: &mut [u8]) -> Result<(), DecodeError> {
        debug_assert_eq!(input.len() % GRANULE_SYMBOLS, 0);
        debug_assert_eq!(out.len(), input.len() / 2);

        let backend = self.resolve();
        if backend == Backend::Scalar {
            return unit::decode_groups(input, out);
        }

        for (i, (granule, bytes)) in input
            .chunks_exact(GRANULE_SYMBOLS)
            .zip(out.chunks_exact_mut(GRANULE_BYTES))
            .enumerate()
        {
            if !backend.decode_granule(granule, bytes) {
                unit::decode_groups(granule, bytes)
                    .map_err(|e| e.offset_by((i * GRANULE_SYMBOLS) as u64))?;
            }
        }
        Ok(())
    }

    fn decode_granule(self, granule: &[char], bytes: &mut [u8]) -> bool {
        match self {
            #[cfg(all(feature = "simd", target_arch = "x86_64"))]
            Backend::Ssse3 => x86_64::decode_granule(granule, bytes),
            #[cfg(all(feature = "simd", target_arch = "aarch64"))]
            Backend::Neon => aarch64::decode_granule(granule, bytes),
            _ => generic::decode_granule(granule, bytes),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::detect()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown backend name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBackend(pub String);

impl fmt::Display for UnknownBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Backend::ALL.iter().map(|b| b.name()).collect();
        write!(
            f,
            "unknown backend '{}' (expected one of: {})",
            self.0,
            names.join(", ")
        )
    }
}

impl std::error::Error for UnknownBackend {}

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|backend| backend.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownBackend(s.to_string()))
    }
}
