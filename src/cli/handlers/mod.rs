pub mod config;
pub mod decode;
pub mod encode;

use crate::cli::global::GlobalArgs;
use rcnb::{Backend, CodecConfig};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

/// The backend to run, noting on stderr when the requested one is unavailable.
pub fn select_backend(config: &CodecConfig, global: &GlobalArgs) -> Backend {
    let preference = config.backend();
    let backend = preference.resolve();
    if let Some(requested) = preference.requested()
        && requested != backend
        && !global.quiet
    {
        eprintln!(
            "Note: {} backend is not available on this CPU, using {}",
            requested, backend
        );
    }
    backend
}

pub fn open_input(file: Option<&PathBuf>) -> io::Result<Box<dyn Read>> {
    Ok(match file {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    })
}

pub fn open_output(file: Option<&PathBuf>) -> io::Result<Box<dyn Write>> {
    Ok(match file {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}
