use std::io;
use std::process::ExitCode;

use clap::Parser;
use route_tracker::cli::{self, Cli};
use route_tracker::RouteError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Verbosity flags pick the default filter; RUST_LOG overrides it:
    //   RUST_LOG=debug route-tracker visit demo cave   # + codec paths and status changes
    //   RUST_LOG=trace route-tracker show demo         # + full DOT source
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp_millis()
        .init();

    match cli::run(cli, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err.downcast_ref::<RouteError>().map_or(1, RouteError::exit_code);
            ExitCode::from(code)
        }
    }
}
