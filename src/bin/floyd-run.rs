//! floyd-run - Execute a Floyd Speak JSON AST file
//!
//! Reads a JSON AST (as produced by the external source parser; see
//! `src/ast_loader.rs` for the accepted wire shapes), runs its top-level
//! statements, resolves `main`, and invokes it.
//!
//! # Usage
//!
//! ```bash
//! floyd-run program.json
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use floyd_speak_core::{run_main, Value};

/// Execute a Floyd Speak JSON AST file
#[derive(Parser, Debug)]
#[command(name = "floyd-run")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON AST file
    ast_file: PathBuf,
}

fn run(args: &Args) -> Result<Value> {
    let text = fs::read_to_string(&args.ast_file)
        .with_context(|| format!("could not read {}", args.ast_file.display()))?;
    let ast_json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in {}", args.ast_file.display()))?;
    run_main(&ast_json, vec![]).with_context(|| "running main failed".to_string())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(value) => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {:#}", "error".red(), e);
            ExitCode::FAILURE
        }
    }
}
