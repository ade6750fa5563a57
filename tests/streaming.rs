//! Randomized streaming tests
//!
//! Feeding a stream in arbitrary pieces must produce exactly what one
//! whole-buffer call produces, on every backend.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rcnb::prelude::*;
use rcnb::{decode_all_with, encode_all_with, max_decode_feed_len, max_encode_feed_len};

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut data = vec![0u8; len];
    rng.fill(&mut data[..]);
    data
}

/// Splits `len` into random piece lengths, including empty pieces.
fn random_splits(rng: &mut StdRng, len: usize) -> Vec<usize> {
    let mut pieces = Vec::new();
    let mut remaining = len;
    while remaining > 0 {
        let piece = rng.random_range(0..=remaining.min(97));
        pieces.push(piece);
        remaining -= piece;
    }
    pieces
}

fn encode_in_pieces(data: &[u8], pieces: &[usize], backend: Backend) -> Vec<char> {
    let mut state = EncodeState::with_backend(backend);
    let mut output = Vec::new();
    let mut offset = 0;
    for &piece in pieces {
        let chunk = &data[offset..offset + piece];
        let mut out = vec!['\0'; max_encode_feed_len(&state, chunk.len())];
        let n = state.feed(chunk, &mut out).unwrap();
        output.extend_from_slice(&out[..n]);
        offset += piece;
    }
    let mut tail = ['\0'; 2];
    let n = state.finalize(&mut tail).unwrap();
    output.extend_from_slice(&tail[..n]);
    output
}

fn decode_in_pieces(
    symbols: &[char],
    pieces: &[usize],
    backend: Backend,
) -> Result<Vec<u8>, DecodeError> {
    let mut state = DecodeState::with_backend(backend);
    let mut output = Vec::new();
    let mut offset = 0;
    for &piece in pieces {
        let chunk = &symbols[offset..offset + piece];
        let mut out = vec![0u8; max_decode_feed_len(&state, chunk.len())];
        let n = state.feed(chunk, &mut out)?;
        output.extend_from_slice(&out[..n]);
        offset += piece;
    }
    let mut tail = [0u8; 1];
    let n = state.finalize(&mut tail)?;
    output.extend_from_slice(&tail[..n]);
    Ok(output)
}

#[test]
fn test_random_encode_splits_match_whole() {
    let mut rng = StdRng::seed_from_u64(0x5243_4e42);
    for _ in 0..200 {
        let len = rng.random_range(0..600);
        let data = random_bytes(&mut rng, len);
        let expected = encode_all_with(&data, Backend::Scalar);
        for backend in Backend::ALL {
            let pieces = random_splits(&mut rng, len);
            assert_eq!(encode_in_pieces(&data, &pieces, backend), expected);
        }
    }
}

#[test]
fn test_random_decode_splits_match_whole() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let len = rng.random_range(0..600);
        let data = random_bytes(&mut rng, len);
        let symbols = encode_all(&data);
        for backend in Backend::ALL {
            let pieces = random_splits(&mut rng, symbols.len());
            assert_eq!(decode_in_pieces(&symbols, &pieces, backend).unwrap(), data);
        }
    }
}

#[test]
fn test_random_corruption_reports_same_error() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let len = rng.random_range(1..300);
        let data = random_bytes(&mut rng, len);
        let mut symbols = encode_all(&data);
        let at = rng.random_range(0..symbols.len());
        symbols[at] = if rng.random_bool(0.5) { 'x' } else { 'ɍ' };

        let expected = decode_all_with(&symbols, Backend::Scalar);
        for backend in Backend::ALL {
            assert_eq!(decode_all_with(&symbols, backend), expected);
            let pieces = random_splits(&mut rng, symbols.len());
            assert_eq!(decode_in_pieces(&symbols, &pieces, backend), expected);
        }
    }
}

#[test]
fn test_stream_adapters_with_tiny_chunks() {
    let mut rng = StdRng::seed_from_u64(1234);
    let data = random_bytes(&mut rng, 5000);

    for chunk_size in [1, 2, 3, 7, 64, 4096] {
        let mut encoder = StreamingEncoder::new(Vec::new()).with_chunk_size(chunk_size);
        let count = encoder.encode(&mut data.as_slice()).unwrap();
        let encoded = encoder.into_inner();
        assert_eq!(count, 2 * data.len() as u64);

        let mut decoder = StreamingDecoder::new(Vec::new()).with_chunk_size(chunk_size);
        let written = decoder.decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(written, data.len() as u64);
        assert_eq!(decoder.into_inner(), data);
    }
}
