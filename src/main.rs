mod cli;

use rcnb::DecodeError;

fn main() {
    let cli = cli::parse();
    let use_color = !cli.global.no_color && DecodeError::color_enabled();
    if let Err(e) = cli::run(cli) {
        report(&*e, use_color);
        std::process::exit(1);
    }
}

/// Prints `err` to stderr. Codec errors render their own `error:`/`hint:` lines.
fn report(err: &(dyn std::error::Error + 'static), use_color: bool) {
    if let Some(decode) = err.downcast_ref::<DecodeError>() {
        eprintln!("{}", decode.render(use_color));
        return;
    }
    if let Some(io) = err.downcast_ref::<std::io::Error>()
        && let Some(decode) = io.get_ref().and_then(|inner| inner.downcast_ref::<DecodeError>())
    {
        eprintln!("{}", decode.render(use_color));
        return;
    }
    eprintln!("error: {}", err);
}
