mod args;
mod global;
mod handlers;

use clap::{Parser, Subcommand};
use rcnb::CodecConfig;

use args::{ConfigAction, DecodeArgs, EncodeArgs};
use global::GlobalArgs;

#[derive(Parser)]
#[command(name = "rcnb")]
#[command(version)]
#[command(
    about = "Encode binary data as RCNB text: look-alike R, C, N and B letters, two symbols per byte",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a file or stdin
    Encode(EncodeArgs),

    /// Decode a file or stdin
    Decode(DecodeArgs),

    /// Inspect alphabets, backends and configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.global.config {
        Some(path) => {
            let mut config = CodecConfig::load_default()?;
            config.merge(CodecConfig::load_from_file(path)?);
            config
        }
        None => CodecConfig::load_with_overrides()?,
    };
    if let Some(backend) = cli.global.backend {
        config.codec.backend = Some(backend.into());
    }

    match cli.command {
        Commands::Encode(args) => handlers::encode::handle(args, &cli.global, &config),
        Commands::Decode(args) => handlers::decode::handle(args, &cli.global, &config),
        Commands::Config { action } => handlers::config::handle(action, &cli.global, &config),
    }
}
