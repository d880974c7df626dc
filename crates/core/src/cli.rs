// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing for the boot harness.

use clap::Parser;
use std::path::PathBuf;

/// Deferred-bootstrap demo harness
#[derive(Parser, Clone, Debug)]
#[command(name = "bootlace", version, about = "Deferred-bootstrap demo harness")]
pub struct Cli {
    /// Number of synthetic feature modules to define beyond the root module
    #[arg(long, default_value_t = 4)]
    pub modules: u32,

    /// Delay applied inside the entry task to widen the interception window
    /// (milliseconds)
    #[arg(long, default_value_t = 25)]
    pub entry_delay_ms: u64,

    /// Make the entry task fail, exercising the degraded boot path
    #[arg(long)]
    pub fail_entry: bool,

    /// Write the boot trace to this file (JSONL)
    #[arg(long)]
    pub trace_file: Option<PathBuf>,

    /// Print the full boot trace as JSON lines instead of a text summary
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
