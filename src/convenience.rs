//! One-shot helpers for whole buffers.
//!
//! Each call runs a fresh stream (init, one feed, finalize) and returns the
//! concatenated output. Streaming through [`EncodeState`]/[`DecodeState`]
//! yields exactly the same result.
//!
//! # Example
//! ```
//! let text = rcnb::encode(b"Hello");
//! assert_eq!(text, "ƦćƝƁȓĉnƅřĊ");
//! assert_eq!(rcnb::decode(&text).unwrap(), b"Hello");
//! ```

use crate::encoders::algorithms::DecodeError;
use crate::encoders::streaming::{DecodeState, EncodeState, encoded_len, max_decoded_len};
use crate::simd::Backend;

/// Encode `data` into symbols on the fastest available backend.
pub fn encode_all(data: &[u8]) -> Vec<char> {
    encode_all_with(data, Backend::detect())
}

pub fn encode_all_with(data: &[u8], backend: Backend) -> Vec<char> {
    let mut state = EncodeState::with_backend(backend);
    let mut out = vec!['\0'; encoded_len(data.len())];
    let written = state.feed_unchecked(data, &mut out);
    state.finalize_unchecked(&mut out[written..]);
    out
}

/// Encode `data` into a `String` of symbols.
pub fn encode(data: &[u8]) -> String {
    encode_with(data, Backend::detect())
}

pub fn encode_with(data: &[u8], backend: Backend) -> String {
    encode_all_with(data, backend).into_iter().collect()
}

/// Decode a complete symbol sequence.
pub fn decode_all(symbols: &[char]) -> Result<Vec<u8>, DecodeError> {
    decode_all_with(symbols, Backend::detect())
}

pub fn decode_all_with(symbols: &[char], backend: Backend) -> Result<Vec<u8>, DecodeError> {
    let mut state = DecodeState::with_backend(backend);
    let mut out = vec![0u8; max_decoded_len(symbols.len())];
    let mut written = state.feed_unchecked(symbols, &mut out)?;
    written += state.finalize(&mut out[written..])?;
    out.truncate(written);
    Ok(out)
}

/// Decode a complete string of symbols. Whitespace is not skipped.
pub fn decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    decode_with(text, Backend::detect())
}

pub fn decode_with(text: &str, backend: Backend) -> Result<Vec<u8>, DecodeError> {
    let symbols: Vec<char> = text.chars().collect();
    decode_all_with(&symbols, backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::algorithms::ErrorKind;

    #[test]
    fn test_known_vectors() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"A"), "Ŗĉ");
        assert_eq!(encode(&[0xFF]), "ǹß");
        assert_eq!(encode(&[0xFF, 0xFF]), "ŇßɍČ");
        assert_eq!(encode(&[0x00, 0x00]), "rcnb");
        assert_eq!(encode(b"Hello"), "ƦćƝƁȓĉnƅřĊ");
        assert_eq!(
            encode(b"The Quick Brown RC Jumps Over the NB Dog."),
            "ȐčnÞȒċƝÞȐĈnƁȒȼǹþȓĆǹƃřČŇbȓƇńƄȓċȵƀȐĉņþŕƇNƅɌĉŇBȓƈȠßŕƇŃBɌċnþȓȼǸƅɌćÑbȒċƝÞƦȻƝƃŕƇNbȓƇNþŕC"
        );
    }

    #[test]
    fn test_byte_sequence_prefix() {
        let data: Vec<u8> = (0..=255).collect();
        assert!(encode(&data).starts_with("rcnBrćŇƄrĊǹþrƇŅƁrȻÑß"));
    }

    #[test]
    fn test_output_is_twice_input() {
        for len in 0..100 {
            let data = vec![0xA5u8; len];
            assert_eq!(encode_all(&data).len(), 2 * len);
        }
    }

    #[test]
    fn test_backends_agree() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 7919 % 251) as u8).collect();
        let reference = encode_with(&data, Backend::Scalar);
        for backend in Backend::ALL {
            assert_eq!(encode_with(&data, backend), reference);
            assert_eq!(decode_with(&reference, backend).unwrap(), data);
        }
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode("r").unwrap_err().kind(), ErrorKind::MalformedTail);
        assert_eq!(decode("rcn").unwrap_err().kind(), ErrorKind::MalformedTail);
        assert_eq!(decode("rcnx").unwrap_err(), DecodeError::invalid_symbol('x', 3));
        assert_eq!(decode("ɍȼȵþ").unwrap_err().kind(), ErrorKind::OutOfRange);
        assert_eq!(decode("rc nb").unwrap_err(), DecodeError::invalid_symbol(' ', 2));
    }
}
