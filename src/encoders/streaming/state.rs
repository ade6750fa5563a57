//! Incremental encode and decode state.
//!
//! Input may arrive in arbitrary pieces; output is identical to a single
//! one-shot transform of the concatenated input. The encoder carries at most
//! one byte between calls, the decoder at most three symbols.
//!
//! Every `feed`/`finalize` call checks the caller's output slice against the
//! worst case for that call before doing anything, and fails with
//! [`DecodeError::OutputTooSmall`] without touching state or output.

use crate::encoders::algorithms::{DecodeError, unit};
use crate::simd::{Backend, GRANULE_BYTES, GRANULE_SYMBOLS, calculate_granules};

/// Symbols produced by encoding `n` bytes.
pub const fn encoded_len(n: usize) -> usize {
    2 * n
}

/// Upper bound on bytes produced by decoding `n` symbols.
pub const fn max_decoded_len(n: usize) -> usize {
    n / 2 + 1
}

/// Encoder state: idle, or holding the first byte of an incomplete pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeState {
    pending: Option<u8>,
    consumed: u64,
    backend: Backend,
}

impl EncodeState {
    pub fn new() -> Self {
        Self::with_backend(Backend::detect())
    }

    pub fn with_backend(backend: Backend) -> Self {
        EncodeState {
            pending: None,
            consumed: 0,
            backend: backend.resolve(),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Whether a byte is waiting for its pair partner.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Bytes fed since the stream started.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Symbols the next `feed` of `n` bytes will write.
    pub fn max_feed_len(&self, n: usize) -> usize {
        (n + usize::from(self.pending.is_some())) / 2 * 4
    }

    /// Encode `input`, writing complete groups to `out`.
    ///
    /// Returns the number of symbols written. A trailing odd byte is held
    /// back until the next call or [`finalize`](Self::finalize).
    pub fn feed(&mut self, input: &[u8], out: &mut [char]) -> Result<usize, DecodeError> {
        let needed = self.max_feed_len(input.len());
        if out.len() < needed {
            return Err(DecodeError::output_too_small(needed, out.len()));
        }
        Ok(self.feed_unchecked(input, out))
    }

    /// `feed` without the capacity check; `out` must hold
    /// [`max_feed_len`](Self::max_feed_len) symbols.
    pub(crate) fn feed_unchecked(&mut self, mut input: &[u8], out: &mut [char]) -> usize {
        let mut written = 0;
        self.consumed += input.len() as u64;

        if let Some(hi) = self.pending {
            let Some((&lo, rest)) = input.split_first() else {
                return 0;
            };
            out[..4].copy_from_slice(&unit::encode_pair(hi, lo));
            self.pending = None;
            written = 4;
            input = rest;
        }

        let pairs = input.len() & !1;
        let (_, bulk) = calculate_granules(pairs, GRANULE_BYTES);
        self.backend
            .encode_granules(&input[..bulk], &mut out[written..written + 2 * bulk]);
        written += 2 * bulk;

        let rest = &input[bulk..pairs];
        unit::encode_pairs(rest, &mut out[written..written + 2 * rest.len()]);
        written += 2 * rest.len();

        if pairs < input.len() {
            self.pending = Some(input[pairs]);
        }
        written
    }

    /// Flush a held byte as a two-symbol tail and reset to the initial state.
    pub fn finalize(&mut self, out: &mut [char]) -> Result<usize, DecodeError> {
        let needed = if self.pending.is_some() { 2 } else { 0 };
        if out.len() < needed {
            return Err(DecodeError::output_too_small(needed, out.len()));
        }
        Ok(self.finalize_unchecked(out))
    }

    pub(crate) fn finalize_unchecked(&mut self, out: &mut [char]) -> usize {
        self.consumed = 0;
        match self.pending.take() {
            Some(byte) => {
                out[..2].copy_from_slice(&unit::encode_byte(byte));
                2
            }
            None => 0,
        }
    }
}

impl Default for EncodeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoder state: up to three buffered symbols of an incomplete group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeState {
    buffer: [char; 4],
    buffered: usize,
    /// Stream position of `buffer[0]`, or of the next symbol when empty
    position: u64,
    backend: Backend,
}

impl DecodeState {
    pub fn new() -> Self {
        Self::with_backend(Backend::detect())
    }

    pub fn with_backend(backend: Backend) -> Self {
        DecodeState {
            buffer: ['\0'; 4],
            buffered: 0,
            position: 0,
            backend: backend.resolve(),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Symbols waiting for the rest of their group.
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// Symbols fed since the stream started, buffered ones included.
    pub fn consumed(&self) -> u64 {
        self.position + self.buffered as u64
    }

    /// Bytes the next `feed` of `n` symbols may write.
    pub fn max_feed_len(&self, n: usize) -> usize {
        (self.buffered + n) / 4 * 2
    }

    /// Decode `input`, writing the bytes of complete groups to `out`.
    ///
    /// Returns the number of bytes written. Up to three trailing symbols are
    /// buffered for the next call. Errors are unrecoverable: the stream must
    /// be abandoned, and `out` holds no guaranteed content.
    pub fn feed(&mut self, input: &[char], out: &mut [u8]) -> Result<usize, DecodeError> {
        let needed = self.max_feed_len(input.len());
        if out.len() < needed {
            return Err(DecodeError::output_too_small(needed, out.len()));
        }
        self.feed_unchecked(input, out)
    }

    pub(crate) fn feed_unchecked(
        &mut self,
        mut input: &[char],
        out: &mut [u8],
    ) -> Result<usize, DecodeError> {
        let mut written = 0;

        if self.buffered > 0 {
            let take = (4 - self.buffered).min(input.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&input[..take]);
            self.buffered += take;
            input = &input[take..];
            if self.buffered < 4 {
                return Ok(0);
            }

            // A failed group is dropped so finalize sees no dangling symbols
            self.buffered = 0;
            let bytes =
                unit::decode_group(&self.buffer).map_err(|e| e.offset_by(self.position))?;
            out[..2].copy_from_slice(&bytes);
            written = 2;
            self.position += 4;
        }

        let groups = input.len() / 4 * 4;
        let (_, bulk) = calculate_granules(groups, GRANULE_SYMBOLS);
        self.backend
            .decode_granules(&input[..bulk], &mut out[written..written + bulk / 2])
            .map_err(|e| e.offset_by(self.position))?;
        written += bulk / 2;

        let rest = &input[bulk..groups];
        unit::decode_groups(rest, &mut out[written..written + rest.len() / 2])
            .map_err(|e| e.offset_by(self.position + bulk as u64))?;
        written += rest.len() / 2;
        self.position += groups as u64;

        let leftover = &input[groups..];
        self.buffer[..leftover.len()].copy_from_slice(leftover);
        self.buffered = leftover.len();
        Ok(written)
    }

    /// Decode a buffered two-symbol tail and reset to the initial state.
    ///
    /// One or three buffered symbols are a [`DecodeError::MalformedTail`].
    /// The state is reset whether or not the tail decodes.
    pub fn finalize(&mut self, out: &mut [u8]) -> Result<usize, DecodeError> {
        let needed = usize::from(self.buffered == 2);
        if out.len() < needed {
            return Err(DecodeError::output_too_small(needed, out.len()));
        }

        let (buffer, buffered, position) = (self.buffer, self.buffered, self.position);
        *self = Self::with_backend(self.backend);

        match buffered {
            0 => Ok(0),
            2 => {
                out[0] = unit::decode_tail(&[buffer[0], buffer[1]])
                    .map_err(|e| e.offset_by(position))?;
                Ok(1)
            }
            n => Err(DecodeError::MalformedTail { buffered: n }),
        }
    }
}

impl Default for DecodeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Start an encode stream on the fastest available backend.
pub fn encode_init() -> EncodeState {
    EncodeState::new()
}

pub fn encode_feed(
    state: &mut EncodeState,
    input: &[u8],
    out: &mut [char],
) -> Result<usize, DecodeError> {
    state.feed(input, out)
}

pub fn encode_finalize(state: &mut EncodeState, out: &mut [char]) -> Result<usize, DecodeError> {
    state.finalize(out)
}

/// Symbols the next [`encode_feed`] of `n` bytes will write.
pub fn max_encode_feed_len(state: &EncodeState, n: usize) -> usize {
    state.max_feed_len(n)
}

/// Start a decode stream on the fastest available backend.
pub fn decode_init() -> DecodeState {
    DecodeState::new()
}

pub fn decode_feed(
    state: &mut DecodeState,
    input: &[char],
    out: &mut [u8],
) -> Result<usize, DecodeError> {
    state.feed(input, out)
}

pub fn decode_finalize(state: &mut DecodeState, out: &mut [u8]) -> Result<usize, DecodeError> {
    state.finalize(out)
}

/// Bytes the next [`decode_feed`] of `n` symbols may write.
pub fn max_decode_feed_len(state: &DecodeState, n: usize) -> usize {
    state.max_feed_len(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::algorithms::ErrorKind;

    const QUICK: &str = "The Quick Brown RC Jumps Over the NB Dog.";
    const QUICK_RCNB: &str = "ȐčnÞȒċƝÞȐĈnƁȒȼǹþȓĆǹƃřČŇbȓƇńƄȓċȵƀȐĉņþŕƇNƅɌĉŇBȓƈȠßŕƇŃBɌċnþȓȼǸƅɌćÑbȒċƝÞƦȻƝƃŕƇNbȓƇNþŕC";

    fn encode_in_pieces(data: &[u8], piece: usize, backend: Backend) -> String {
        let mut state = EncodeState::with_backend(backend);
        let mut text = String::new();
        for chunk in data.chunks(piece.max(1)) {
            let mut out = vec!['\0'; state.max_feed_len(chunk.len())];
            let n = state.feed(chunk, &mut out).unwrap();
            text.extend(&out[..n]);
        }
        let mut tail = ['\0'; 2];
        let n = state.finalize(&mut tail).unwrap();
        text.extend(&tail[..n]);
        text
    }

    fn decode_in_pieces(symbols: &[char], piece: usize, backend: Backend) -> Result<Vec<u8>, DecodeError> {
        let mut state = DecodeState::with_backend(backend);
        let mut bytes = Vec::new();
        for chunk in symbols.chunks(piece.max(1)) {
            let mut out = vec![0u8; state.max_feed_len(chunk.len())];
            let n = state.feed(chunk, &mut out)?;
            bytes.extend_from_slice(&out[..n]);
        }
        let mut tail = [0u8; 1];
        let n = state.finalize(&mut tail)?;
        bytes.extend_from_slice(&tail[..n]);
        Ok(bytes)
    }

    #[test]
    fn test_known_vector_any_split() {
        for backend in [Backend::Scalar, Backend::detect()] {
            for piece in [1, 2, 3, 7, 41] {
                assert_eq!(encode_in_pieces(QUICK.as_bytes(), piece, backend), QUICK_RCNB);
            }
            let symbols: Vec<char> = QUICK_RCNB.chars().collect();
            for piece in [1, 3, 4, 5, 82] {
                assert_eq!(
                    decode_in_pieces(&symbols, piece, backend).unwrap(),
                    QUICK.as_bytes()
                );
            }
        }
    }

    #[test]
    fn test_single_byte_streams() {
        assert_eq!(encode_in_pieces(b"A", 1, Backend::Scalar), "Ŗĉ");
        assert_eq!(encode_in_pieces(&[0xFF], 1, Backend::Scalar), "ǹß");
        assert_eq!(encode_in_pieces(&[], 1, Backend::Scalar), "");
    }

    #[test]
    fn test_pending_byte_then_empty_feed() {
        let mut state = EncodeState::with_backend(Backend::Portable);
        let mut out = ['\0'; 8];
        assert_eq!(state.feed(b"x", &mut out), Ok(0));
        assert!(state.has_pending());
        assert_eq!(state.feed(b"", &mut out), Ok(0));
        assert!(state.has_pending());
        assert_eq!(state.feed(b"y", &mut out), Ok(4));
        assert!(!state.has_pending());
        assert_eq!(state.consumed(), 2);
        assert_eq!(state.finalize(&mut []), Ok(0));
        assert_eq!(state.consumed(), 0);
    }

    #[test]
    fn test_encode_output_too_small_leaves_state() {
        let mut state = EncodeState::with_backend(Backend::Scalar);
        let mut out = ['\0'; 4];
        state.feed(b"a", &mut out).unwrap();
        let before = state.clone();

        let mut small = ['\0'; 3];
        let err = state.feed(b"bcd", &mut small).unwrap_err();
        assert_eq!(err, DecodeError::output_too_small(8, 3));
        assert_eq!(small, ['\0'; 3]);
        assert_eq!(state, before);

        assert_eq!(
            state.finalize(&mut ['\0'; 1]),
            Err(DecodeError::output_too_small(2, 1))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_decode_output_too_small_leaves_state() {
        let mut state = DecodeState::with_backend(Backend::Scalar);
        let symbols: Vec<char> = "rcnbrc".chars().collect();
        let before = state.clone();
        let err = state.feed(&symbols, &mut [0u8; 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutputTooSmall);
        assert_eq!(state, before);
    }

    #[test]
    fn test_decode_buffers_partial_group() {
        let mut state = DecodeState::with_backend(Backend::Scalar);
        let mut out = [0u8; 4];
        let symbols: Vec<char> = "rcnb".chars().collect();
        assert_eq!(state.feed(&symbols[..3], &mut out), Ok(0));
        assert_eq!(state.buffered(), 3);
        assert_eq!(state.consumed(), 3);
        assert_eq!(state.feed(&symbols[3..], &mut out), Ok(2));
        assert_eq!(state.consumed(), 4);
        assert_eq!(&out[..2], &[0, 0]);
        assert_eq!(state.buffered(), 0);
    }

    #[test]
    fn test_decode_malformed_tail_resets() {
        for leftover in ["r", "rcn"] {
            let symbols: Vec<char> = leftover.chars().collect();
            let mut state = DecodeState::with_backend(Backend::Scalar);
            state.feed(&symbols, &mut []).unwrap();
            assert_eq!(
                state.finalize(&mut [0u8; 1]),
                Err(DecodeError::MalformedTail {
                    buffered: symbols.len()
                })
            );
            assert_eq!(state.buffered(), 0);
            assert_eq!(state.finalize(&mut []), Ok(0));
        }
    }

    #[test]
    fn test_failed_buffered_group_is_dropped() {
        let mut state = DecodeState::with_backend(Backend::Scalar);
        let mut out = [0u8; 2];
        let first: Vec<char> = "rc".chars().collect();
        let second: Vec<char> = "nx".chars().collect();
        assert_eq!(state.feed(&first, &mut out), Ok(0));
        assert_eq!(
            state.feed(&second, &mut out),
            Err(DecodeError::invalid_symbol('x', 3))
        );
        assert_eq!(state.buffered(), 0);
        assert_eq!(state.finalize(&mut out), Ok(0));
    }

    #[test]
    fn test_error_positions_are_absolute() {
        let mut symbols: Vec<char> = encode_in_pieces(&[0x5A; 100], 100, Backend::Scalar)
            .chars()
            .collect();
        symbols[150] = '?';
        for backend in [Backend::Scalar, Backend::Portable, Backend::detect()] {
            for piece in [1, 5, 64, 200] {
                assert_eq!(
                    decode_in_pieces(&symbols, piece, backend),
                    Err(DecodeError::invalid_symbol('?', 150)),
                    "backend {} piece {}",
                    backend,
                    piece
                );
            }
        }
    }

    #[test]
    fn test_tail_error_position() {
        let mut symbols: Vec<char> = "rcnbrcnb".chars().collect();
        symbols.extend(['n', 'c']);
        assert_eq!(
            decode_in_pieces(&symbols, 3, Backend::Scalar),
            Err(DecodeError::invalid_symbol('c', 9))
        );
        let symbols: Vec<char> = "rcnbȐc".chars().collect();
        assert_eq!(
            decode_in_pieces(&symbols, 6, Backend::Scalar),
            Err(DecodeError::out_of_range(4, 135))
        );
    }

    #[test]
    fn test_free_functions() {
        let mut enc = encode_init();
        let mut symbols = vec!['\0'; max_encode_feed_len(&enc, 3)];
        let n = encode_feed(&mut enc, b"abc", &mut symbols).unwrap();
        symbols.truncate(n);
        let mut tail = ['\0'; 2];
        let t = encode_finalize(&mut enc, &mut tail).unwrap();
        symbols.extend(&tail[..t]);
        assert_eq!(symbols.len(), encoded_len(3));

        let mut dec = decode_init();
        let mut bytes = vec![0u8; max_decoded_len(symbols.len())];
        let n = decode_feed(&mut dec, &symbols, &mut bytes).unwrap();
        let t = decode_finalize(&mut dec, &mut bytes[n..]).unwrap();
        bytes.truncate(n + t);
        assert_eq!(bytes, b"abc");
        assert!(max_decode_feed_len(&dec, 8) == 4);
    }
}
