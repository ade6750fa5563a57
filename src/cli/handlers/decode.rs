use crate::cli::{args::DecodeArgs, global::GlobalArgs, handlers};
use rcnb::{CodecConfig, StreamingDecoder};

pub fn handle(
    args: DecodeArgs,
    global: &GlobalArgs,
    config: &CodecConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = handlers::select_backend(config, global);
    let mut reader = handlers::open_input(args.file.as_ref())?;
    let writer = handlers::open_output(args.output.as_ref())?;

    // Whitespace between symbols (trailing newlines, wrapped lines) is skipped
    let mut decoder = StreamingDecoder::new(writer)
        .with_backend(backend)
        .with_chunk_size(config.chunk_size());
    decoder.decode(&mut reader)?;

    Ok(())
}
