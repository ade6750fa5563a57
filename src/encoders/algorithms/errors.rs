use std::fmt;

/// Fieldless discriminant of [`DecodeError`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSymbol,
    OutOfRange,
    MalformedTail,
    OutputTooSmall,
}

/// Errors that can occur while running the codec.
///
/// Positions are absolute symbol offsets from the start of the stream, so a
/// failure reported by the third `feed` call still points at the right place
/// in the full input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A symbol is not in any class, or not in the class its position needs
    InvalidSymbol { symbol: char, position: u64 },
    /// The symbols are individually valid but spell a value no encoder emits
    OutOfRange { position: u64, value: u32 },
    /// The stream ended with 1 or 3 symbols left over
    MalformedTail { buffered: usize },
    /// The caller's output slice cannot hold the worst-case output
    OutputTooSmall { needed: usize, available: usize },
}

impl DecodeError {
    pub fn invalid_symbol(symbol: char, position: u64) -> Self {
        DecodeError::InvalidSymbol { symbol, position }
    }

    pub fn out_of_range(position: u64, value: u32) -> Self {
        DecodeError::OutOfRange { position, value }
    }

    pub fn output_too_small(needed: usize, available: usize) -> Self {
        DecodeError::OutputTooSmall { needed, available }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::InvalidSymbol { .. } => ErrorKind::InvalidSymbol,
            DecodeError::OutOfRange { .. } => ErrorKind::OutOfRange,
            DecodeError::MalformedTail { .. } => ErrorKind::MalformedTail,
            DecodeError::OutputTooSmall { .. } => ErrorKind::OutputTooSmall,
        }
    }

    /// Shift a group-relative position to an absolute stream position.
    pub(crate) fn offset_by(self, base: u64) -> Self {
        match self {
            DecodeError::InvalidSymbol { symbol, position } => DecodeError::InvalidSymbol {
                symbol,
                position: position + base,
            },
            DecodeError::OutOfRange { position, value } => DecodeError::OutOfRange {
                position: position + base,
                value,
            },
            other => other,
        }
    }
}

impl DecodeError {
    /// Renders the `error:` and `hint:` lines, with ANSI colors if `use_color`.
    pub fn render(&self, use_color: bool) -> String {
        let (message, hint) = self.message_and_hint();
        if use_color {
            format!(
                "\x1b[1;31merror:\x1b[0m {}\n\x1b[1;36mhint:\x1b[0m {}",
                message, hint
            )
        } else {
            format!("error: {}\nhint: {}", message, hint)
        }
    }

    /// Whether stderr output should be colored: a terminal without `NO_COLOR`.
    pub fn color_enabled() -> bool {
        should_use_color()
    }

    fn message_and_hint(&self) -> (String, String) {
        match self {
            DecodeError::InvalidSymbol { symbol, position } => (
                format!(
                    "invalid symbol '{}' (U+{:04X}) at position {}",
                    symbol.escape_debug(),
                    *symbol as u32,
                    position
                ),
                "every symbol must be one of the R, C, N or B look-alike letters".to_string(),
            ),
            DecodeError::OutOfRange { position, value } => (
                format!(
                    "symbol group at position {} decodes to {:#06x}, outside the encodable range",
                    position, value
                ),
                "the group is well-formed but was not produced by an rcnb encoder".to_string(),
            ),
            DecodeError::MalformedTail { buffered } => (
                format!("input ended with {} dangling symbol(s)", buffered),
                "rcnb output always has an even number of symbols; check for truncation"
                    .to_string(),
            ),
            DecodeError::OutputTooSmall { needed, available } => (
                format!(
                    "output buffer too small: need {} slots, have {}",
                    needed, available
                ),
                "size buffers with encoded_len() / max_decoded_len()".to_string(),
            ),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(should_use_color()))
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for std::io::Error {
    fn from(err: DecodeError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidData, err)
    }
}

/// Check if colored output should be used
fn should_use_color() -> bool {
    // Respect NO_COLOR environment variable
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    use std::io::IsTerminal;
    std::io::stderr().is_terminal()
}
