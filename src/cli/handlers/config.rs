use crate::cli::{
    args::{ConfigAction, ConfigCategory},
    global::GlobalArgs,
    handlers,
};
use rcnb::alphabet::SymbolClass;
use rcnb::{Backend, CodecConfig, NewlineMode};

pub fn handle(
    action: ConfigAction,
    global: &GlobalArgs,
    config: &CodecConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::List { category, json } => handle_list(category, json),
        ConfigAction::Show => handle_show(global, config),
    }
}

fn handle_list(
    category: Option<ConfigCategory>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let alphabets: Vec<(String, String)> = SymbolClass::ALL
        .iter()
        .map(|class| (class.to_string(), class.symbols().iter().collect()))
        .collect();
    let available: Vec<&str> = Backend::ALL
        .iter()
        .filter(|b| b.is_available())
        .map(|b| b.name())
        .collect();

    if json {
        let alphabet_json: serde_json::Map<String, serde_json::Value> = alphabets
            .iter()
            .map(|(name, symbols)| (name.clone(), symbols.clone().into()))
            .collect();
        let backend_json: Vec<serde_json::Value> = Backend::ALL
            .iter()
            .map(|b| {
                serde_json::json!({
                    "name": b.name(),
                    "available": b.is_available(),
                    "description": b.description(),
                })
            })
            .collect();

        let output = match category {
            Some(ConfigCategory::Alphabets) => serde_json::json!({ "alphabets": alphabet_json }),
            Some(ConfigCategory::Backends) => serde_json::json!({
                "backends": backend_json,
                "detected": Backend::detect().name(),
            }),
            None => serde_json::json!({
                "alphabets": alphabet_json,
                "backends": backend_json,
                "detected": Backend::detect().name(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match category {
        Some(ConfigCategory::Alphabets) => {
            for (name, symbols) in &alphabets {
                println!("{} {}", name, symbols);
            }
        }
        Some(ConfigCategory::Backends) => {
            println!("{}", available.join(","));
        }
        None => {
            println!("Alphabets:");
            for (name, symbols) in &alphabets {
                println!("  {}  {:>2} symbols  {}", name, symbols.chars().count(), symbols);
            }
            println!("\nBackends:");
            for backend in Backend::ALL {
                let marker = if backend == Backend::detect() {
                    "*"
                } else if backend.is_available() {
                    " "
                } else {
                    "-"
                };
                println!(
                    "  {} {:<9} {}",
                    marker,
                    backend.name(),
                    backend.description()
                );
            }
            println!("\n  * detected, - not available on this CPU");
            println!("\nUse 'config list alphabets|backends' for machine-readable output");
            println!("Use --json for structured output");
        }
    }

    Ok(())
}

fn handle_show(
    global: &GlobalArgs,
    config: &CodecConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = handlers::select_backend(config, global);
    let newline = match config.newline() {
        NewlineMode::Auto => "auto",
        NewlineMode::Always => "always",
        NewlineMode::Never => "never",
    };

    println!("Backend: {} ({:?} requested)", backend, config.backend());
    println!("  {}", backend.description());
    println!("Chunk size: {} bytes", config.chunk_size());
    println!("Trailing newline: {}", newline);

    if config.sources.is_empty() {
        println!("Sources: built-in defaults");
    } else {
        println!("Sources:");
        println!("  built-in defaults");
        for source in &config.sources {
            println!("  {}", source.display());
        }
    }

    Ok(())
}
