// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Boot harness binary entry point.

use clap::Parser;

use bootlace::cli::Cli;
use bootlace::harness;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let code = harness::run(cli).await?;
    if code != harness::exit_codes::SUCCESS {
        std::process::exit(code);
    }
    Ok(())
}
