//! stream-link - find the DASH manifest a video player page requests
//!
//! Loads the player in a headless Chromium, watches outgoing requests and
//! prints the first one whose path ends with `/index.mpd`.

mod browser;
mod cli;
mod config;
mod error;
mod extractor;
mod logging;
mod normalize;
mod race;

use clap::Parser;
use cli::Cli;
use error::ExtractError;
use std::io::Write;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version go to stdout and are not failures.
            let code = if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            // Logging is not up yet and a closed stdout/stderr leaves nowhere to report to.
            let _ = e.print();
            return code;
        }
    };

    logging::init_logging(cli.verbose, cli.log_format);

    let result = cli.run().await;
    report(result, &mut std::io::stdout().lock(), &mut std::io::stderr().lock())
}

/// Print the link to `out` and succeed, or the error to `err` and fail.
fn report(
    result: Result<String, ExtractError>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> ExitCode {
    match result {
        Ok(link) => {
            if let Err(e) = writeln!(out, "{link}") {
                tracing::debug!(error = %e, "Failed to write stream link");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Err(write_err) = writeln!(err, "{e}") {
                tracing::debug!(error = %write_err, "Failed to write error message");
            }
            ExitCode::FAILURE
        }
    }
}
