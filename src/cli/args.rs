use clap::{Args, Subcommand, ValueEnum};
use rcnb::BackendPreference;
use std::path::PathBuf;

/// Arguments for encoding data
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Input file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for decoding data
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Input file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Config subcommand actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// List alphabets and backends
    List {
        /// What to list: alphabets, backends
        #[arg(value_name = "TYPE")]
        category: Option<ConfigCategory>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Show,
}

/// Categories for config list command
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum ConfigCategory {
    Alphabets,
    Backends,
}

/// Backend choice on the command line
#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum BackendArg {
    Auto,
    Scalar,
    Portable,
    Ssse3,
    Neon,
}

impl From<BackendArg> for BackendPreference {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => BackendPreference::Auto,
            BackendArg::Scalar => BackendPreference::Scalar,
            BackendArg::Portable => BackendPreference::Portable,
            BackendArg::Ssse3 => BackendPreference::Ssse3,
            BackendArg::Neon => BackendPreference::Neon,
        }
    }
}
