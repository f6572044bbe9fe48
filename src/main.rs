//! Binary entrypoint for the `envrunner` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // A missing .env is fine; present values never override the real environment.
    let _ = dotenvy::dotenv();
    match envrunner::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
