use clap::Parser;
use unschedule_cli::{Cli, dispatch};
use unschedule_core::{LoggingDestination, init_logging};

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LoggingDestination::FileAndStderr) {
        eprintln!("Warning: logging disabled: {err}");
    }

    if let Err(err) = dispatch(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
