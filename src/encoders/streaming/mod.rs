mod decoder;
mod encoder;
mod state;

pub use decoder::StreamingDecoder;
pub use encoder::StreamingEncoder;
pub use state::{
    DecodeState, EncodeState, decode_feed, decode_finalize, decode_init, encode_feed,
    encode_finalize, encode_init, encoded_len, max_decode_feed_len, max_decoded_len,
    max_encode_feed_len,
};
