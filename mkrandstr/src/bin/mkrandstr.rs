use std::ffi::OsString;
use std::io::BufWriter;
use std::process::ExitCode;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use mkrandstr::{write_line, Diagnostics, Error, Options, FATAL_ALLOCATION};

fn setup_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not install logger: {err}");
    }
}

fn print_line(line: &str) -> Result<(), Error> {
    let mut fout = BufWriter::new(std::io::stdout().lock());
    write_line(&mut fout, line)
}

fn main() -> ExitCode {
    setup_logging();
    let options = Options::default();
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let mut diags = Diagnostics::default();
    let length = diags.check(options.resolve_length(&args));
    let length = match length {
        Some(length) if diags.is_empty() => length,
        _ => {
            let mut stdout = std::io::stdout().lock();
            if let Err(err) = diags.report(&mut stdout) {
                tracing::warn!("could not report errors: {err}");
            }
            return ExitCode::FAILURE;
        }
    };
    let string = match options.generate_random_string(length) {
        Ok(string) => string,
        Err(Error::AllocationFailure(_)) => {
            if let Err(err) = print_line(FATAL_ALLOCATION) {
                tracing::warn!("{err}");
            }
            return ExitCode::FAILURE;
        }
        Err(err) => {
            tracing::warn!("{err}");
            return ExitCode::FAILURE;
        }
    };
    match print_line(&string) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::warn!("{err}");
            ExitCode::FAILURE
        }
    }
}
