//! Sands command line

use std::{
    io::{self, Write},
    process::ExitCode,
};

use sands_app::observability;

use crate::cli::Cli;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::load();

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        _ = writeln!(io::stderr(), "error: {error}");

        return ExitCode::FAILURE;
    }

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            _ = writeln!(io::stderr(), "error: {message}");

            ExitCode::FAILURE
        }
    }
}
