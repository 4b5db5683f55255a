mod app;
mod config;
mod error;
mod library;
mod local;
mod logging;
mod remote;
mod runtime;
mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    match runtime::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("tandem: {e}");
            ExitCode::FAILURE
        }
    }
}
