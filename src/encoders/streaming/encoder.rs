use crate::encoders::streaming::state::{EncodeState, encoded_len};
use crate::simd::Backend;
use std::io::{ErrorKind, Read, Write};

pub(crate) const CHUNK_SIZE: usize = 4096; // 4KB chunks

/// Streaming encoder for processing large amounts of data efficiently.
///
/// Reads bytes in chunks and writes the symbols as UTF-8, so whole files
/// never have to sit in memory.
pub struct StreamingEncoder<W: Write> {
    writer: W,
    backend: Backend,
    chunk_size: usize,
}

impl<W: Write> StreamingEncoder<W> {
    /// Creates a new streaming encoder writing to `writer`.
    pub fn new(writer: W) -> Self {
        StreamingEncoder {
            writer,
            backend: Backend::detect(),
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Sets the bulk transform backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the read chunk size in bytes (at least 1).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Consumes the encoder, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Encodes everything `reader` yields.
    ///
    /// Returns the number of symbols written.
    pub fn encode<R: Read>(&mut self, reader: &mut R) -> std::io::Result<u64> {
        let mut state = EncodeState::with_backend(self.backend);
        let mut buffer = vec![0u8; self.chunk_size];
        let mut symbols = vec!['\0'; encoded_len(self.chunk_size + 1)];
        let mut text = String::with_capacity(symbols.len() * 2);
        let mut total = 0u64;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let written = state.feed(&buffer[..n], &mut symbols)?;
            total += self.write_symbols(&symbols[..written], &mut text)?;
        }

        let written = state.finalize(&mut symbols)?;
        total += self.write_symbols(&symbols[..written], &mut text)?;
        self.writer.flush()?;
        Ok(total)
    }

    fn write_symbols(&mut self, symbols: &[char], text: &mut String) -> std::io::Result<u64> {
        text.clear();
        text.extend(symbols);
        self.writer.write_all(text.as_bytes())?;
        Ok(symbols.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_encode_chunk_sizes_agree() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let expected = crate::convenience::encode(&data);
        for chunk_size in [1, 2, 3, 31, 32, 33, 4096] {
            let mut encoder = StreamingEncoder::new(Vec::new()).with_chunk_size(chunk_size);
            let count = encoder.encode(&mut Cursor::new(&data)).unwrap();
            assert_eq!(count, 2000);
            let output = String::from_utf8(encoder.into_inner()).unwrap();
            assert_eq!(output, expected, "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn test_encode_empty() {
        let mut encoder = StreamingEncoder::new(Vec::new());
        assert_eq!(encoder.encode(&mut Cursor::new(b"")).unwrap(), 0);
        assert!(encoder.into_inner().is_empty());
    }
}
