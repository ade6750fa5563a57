use crate::encoders::streaming::encoder::CHUNK_SIZE;
use crate::encoders::streaming::state::DecodeState;
use crate::simd::Backend;
use std::io::{Error, ErrorKind, Read, Write};

/// Streaming decoder for processing large amounts of encoded data efficiently.
///
/// Reads UTF-8 text in chunks, carrying multi-byte sequences split across
/// reads, and writes the decoded bytes. ASCII whitespace between symbols is
/// skipped; error positions count symbols only.
pub struct StreamingDecoder<W: Write> {
    writer: W,
    backend: Backend,
    chunk_size: usize,
}

impl<W: Write> StreamingDecoder<W> {
    /// Creates a new streaming decoder writing to `writer`.
    pub fn new(writer: W) -> Self {
        StreamingDecoder {
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

    /// Consumes the decoder, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Decodes everything `reader` yields.
    ///
    /// Returns the number of bytes written. Invalid UTF-8 and every
    /// [`DecodeError`](crate::DecodeError) surface as
    /// [`ErrorKind::InvalidData`].
    pub fn decode<R: Read>(&mut self, reader: &mut R) -> std::io::Result<u64> {
        let mut state = DecodeState::with_backend(self.backend);
        // Up to 3 bytes of an incomplete UTF-8 sequence precede each read
        let mut buffer = vec![0u8; self.chunk_size + 3];
        let mut carried = 0;
        let mut symbols: Vec<char> = Vec::with_capacity(self.chunk_size + 3);
        let mut output = Vec::new();
        let mut total = 0u64;

        loop {
            let n = match reader.read(&mut buffer[carried..]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            let filled = carried + n;

            let valid = match std::str::from_utf8(&buffer[..filled]) {
                Ok(text) => text,
                // Incomplete sequence at the end: decode the prefix, keep the rest
                Err(e) if e.error_len().is_none() => std::str::from_utf8(&buffer[..e.valid_up_to()])
                    .map_err(|e| Error::new(ErrorKind::InvalidData, e))?,
                Err(e) => return Err(Error::new(ErrorKind::InvalidData, e)),
            };
            let consumed = valid.len();

            symbols.clear();
            symbols.extend(valid.chars().filter(|c| !c.is_ascii_whitespace()));
            output.resize(state.max_feed_len(symbols.len()), 0);
            let written = state.feed(&symbols, &mut output)?;
            self.writer.write_all(&output[..written])?;
            total += written as u64;

            buffer.copy_within(consumed..filled, 0);
            carried = filled - consumed;
        }

        if carried > 0 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                "stream ended inside a UTF-8 sequence",
            ));
        }

        let mut tail = [0u8; 1];
        let written = state.finalize(&mut tail)?;
        self.writer.write_all(&tail[..written])?;
        self.writer.flush()?;
        Ok(total + written as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeError;
    use std::io::Cursor;

    fn decode_with(text: &[u8], chunk_size: usize) -> std::io::Result<Vec<u8>> {
        let mut decoder = StreamingDecoder::new(Vec::new()).with_chunk_size(chunk_size);
        decoder.decode(&mut Cursor::new(text))?;
        Ok(decoder.into_inner())
    }

    #[test]
    fn test_utf8_split_across_reads() {
        let data = b"split me across many tiny reads!";
        let text = crate::convenience::encode(data);
        for chunk_size in [1, 2, 3, 5, 64] {
            assert_eq!(decode_with(text.as_bytes(), chunk_size).unwrap(), data);
        }
    }

    #[test]
    fn test_skips_whitespace() {
        let text = format!(
            "{}\n{}\r\n",
            crate::convenience::encode(b"ab"),
            crate::convenience::encode(b"c")
        );
        assert_eq!(decode_with(text.as_bytes(), 4096).unwrap(), b"abc");
    }

    #[test]
    fn test_invalid_utf8() {
        let err = decode_with(&[b'r', 0xFF, b'c'], 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        // Truncated two-byte sequence at end of stream
        let err = decode_with(&[b'r', b'c', 0xC8], 16).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_decode_error_is_invalid_data() {
        let err = decode_with("rcnbr".as_bytes(), 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        let inner = err.into_inner().unwrap().downcast::<DecodeError>().unwrap();
        assert_eq!(*inner, DecodeError::MalformedTail { buffered: 1 });
    }
}
