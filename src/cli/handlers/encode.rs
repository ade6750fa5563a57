use crate::cli::{args::EncodeArgs, global::GlobalArgs, handlers};
use rcnb::{CodecConfig, NewlineMode, StreamingEncoder};
use std::io::{self, IsTerminal, Write};

pub fn handle(
    args: EncodeArgs,
    global: &GlobalArgs,
    config: &CodecConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = handlers::select_backend(config, global);
    let mut reader = handlers::open_input(args.file.as_ref())?;
    let writer = handlers::open_output(args.output.as_ref())?;

    let mut encoder = StreamingEncoder::new(writer)
        .with_backend(backend)
        .with_chunk_size(config.chunk_size());
    encoder.encode(&mut reader)?;
    let mut writer = encoder.into_inner();

    let newline = match config.newline() {
        NewlineMode::Always => true,
        NewlineMode::Never => false,
        NewlineMode::Auto => args.output.is_none() && io::stdout().is_terminal(),
    };
    if newline {
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(())
}
