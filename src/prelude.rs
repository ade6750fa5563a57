//! Convenient re-exports for common usage.
//!
//! # Example
//!
//! ```
//! use rcnb::prelude::*;
//!
//! let mut state = EncodeState::with_backend(Backend::Scalar);
//! let mut out = vec!['\0'; encoded_len(3)];
//! let n = state.feed(b"abc", &mut out).unwrap();
//! let m = state.finalize(&mut out[n..]).unwrap();
//! assert_eq!(decode_all(&out[..n + m]).unwrap(), b"abc");
//! ```

pub use crate::{
    // Bulk transform
    Backend,
    DecodeError,
    // Streaming
    DecodeState,
    EncodeState,
    ErrorKind,
    StreamingDecoder,
    StreamingEncoder,

    // One-shot helpers
    decode,
    decode_all,
    encode,
    encode_all,
    encoded_len,
    max_decoded_len,
};
