//! RCNB: a reversible binary-to-text codec.
//!
//! Every byte pair becomes four symbols drawn from look-alike alphabets for
//! the letters R, C, N and B; a lone trailing byte becomes two. Output is
//! always exactly twice as many symbols as input bytes.
//!
//! The codec runs as a resumable stream ([`EncodeState`], [`DecodeState`])
//! whose bulk work is delegated to a [`Backend`]: a scalar reference, a
//! portable lane kernel, or SSSE3/NEON kernels when the CPU has them. All
//! backends produce identical output and identical errors.
//!
//! ```
//! let text = rcnb::encode(b"RC");
//! assert_eq!(rcnb::decode(&text).unwrap(), b"RC");
//! ```

mod core;
mod encoders;

pub mod convenience;
pub mod prelude;
pub mod simd;

pub use crate::core::alphabet;
pub use crate::core::config::{
    BackendPreference, CodecConfig, CodecSettings, DEFAULT_CHUNK_SIZE, NewlineMode,
    OutputSettings,
};
pub use crate::encoders::algorithms::{DecodeError, ErrorKind, unit};
pub use crate::encoders::streaming::{
    DecodeState, EncodeState, StreamingDecoder, StreamingEncoder, decode_feed, decode_finalize,
    decode_init, encode_feed, encode_finalize, encode_init, encoded_len, max_decode_feed_len,
    max_decoded_len, max_encode_feed_len,
};
pub use convenience::{
    decode, decode_all, decode_all_with, decode_with, encode, encode_all, encode_all_with,
    encode_with,
};
pub use simd::{Backend, UnknownBackend};
