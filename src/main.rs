//! depcmake CLI entry point.
//!
//! Parses arguments, runs the selected subcommand and turns failures into a
//! colored error report with a hint where one exists.

use clap::Parser;

use depcmake::cli::Cli;
use depcmake::core::error::display_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(error) = cli.execute().await {
        display_error(&error);
        std::process::exit(1);
    }
}
