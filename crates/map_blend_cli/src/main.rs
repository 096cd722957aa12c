//! map-blend - render tile layers from painted bitmaps and rule tables

use std::process::ExitCode;

mod cli;
mod error;
mod export;
mod project;

fn main() -> ExitCode {
    cli::run()
}
