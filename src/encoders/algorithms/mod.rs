pub mod errors;
pub mod unit;

pub use errors::{DecodeError, ErrorKind};
