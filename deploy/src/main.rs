mod artifact;
mod command_line;
mod deploy;
mod utils;

use std::{io::Write, process::ExitCode};

use anyhow::Result;
use clap::Parser;
use command_line::CommandLine;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cmd = CommandLine::parse();
    let result = cmd.execute().await;
    ExitCode::from(exit_status(&result, &mut std::io::stdout()))
}

/// Errors are reported once, on `out`.
fn exit_status<T>(result: &Result<T>, out: &mut impl Write) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            let _ = writeln!(out, "{:?}", e);
            1
        }
    }
}
