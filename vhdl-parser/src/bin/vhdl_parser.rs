#!/usr/bin/env rust
use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use vhdl_parser::cli::ParsedArgs;
use vhdl_parser::export::{export_json, to_json_string};
use vhdl_parser::{parse_cli_args, Module, VhdlParser};

#[derive(Parser)]
#[command(name = "vhdl-parser")]
#[command(about = "Extracts the entity name and ports of a VHDL file as JSON.")]
#[command(version)]
struct Cli {
    /// Input .vhd files
    files: Vec<PathBuf>,

    /// JSON output path, or '-' for stdout (default: output.json next to the input)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Strip comments only, keep the original whitespace
    #[arg(long = "no-normalize")]
    no_normalize: bool,

    /// Extraction backend: scan or grammar
    #[arg(long = "backend", default_value = "scan")]
    backend: String,

    /// Print the entity syntax tree as JSON instead of exporting ports
    #[arg(long = "dump-ast")]
    dump_ast: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Stop after the first file that fails
    #[arg(long = "fail-fast")]
    fail_fast: bool,
}

fn main() {
    let cli_args = Cli::parse();

    let parsed_args = match parse_cli_args(
        cli_args.files,
        cli_args.output,
        cli_args.no_normalize,
        &cli_args.backend,
        cli_args.dump_ast,
        cli_args.verbose,
        cli_args.fail_fast,
    ) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {}", err);
            eprintln!();
            eprintln!("Usage: vhdl-parser [OPTIONS] <file>...");
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  vhdl-parser and_gate.vhd");
            eprintln!("  vhdl-parser -o build/top.json --backend grammar top.vhd");
            eprintln!("  vhdl-parser --dump-ast top.vhd");
            process::exit(1);
        }
    };

    let default_level = if parsed_args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    log::debug!("files to parse: {:?}", parsed_args.files);
    log::debug!("parser config: {:?}", parsed_args.config);

    let parser = VhdlParser::with_config(parsed_args.config.clone());
    let mut had_errors = false;

    for file_path in &parsed_args.files {
        if let Err(err) = process_file(&parser, &parsed_args, file_path) {
            eprintln!("Error: {:#}", err);
            had_errors = true;
            if parsed_args.fail_fast {
                process::exit(1);
            }
        }
    }

    process::exit(if had_errors { 1 } else { 0 });
}

fn process_file(parser: &VhdlParser, args: &ParsedArgs, file_path: &Path) -> Result<()> {
    log::debug!("parsing file: {}", file_path.display());

    if args.dump_ast {
        let content = vhdl_parser::parser::read_source(file_path)?;
        let tree = parser
            .dump_syntax_tree(&content)
            .with_context(|| format!("Error parsing {}", file_path.display()))?;
        println!("{}", to_json_string(&tree)?);
        return Ok(());
    }

    let module = parser
        .parse_file(file_path)
        .with_context(|| format!("Error parsing {}", file_path.display()))?;

    let module = match module {
        Some(module) => {
            log::info!(
                "{}: entity {}, {} port(s)",
                file_path.display(),
                module.module_name,
                module.ports.len()
            );
            module
        }
        None => {
            log::warn!("{}: no entity declaration found", file_path.display());
            Module::default()
        }
    };

    match args.output_path_for(file_path) {
        Some(out_path) => {
            let written = export_json(&module, &out_path)?;
            println!("{}: saved {}", file_path.display(), written.display());
        }
        None => println!("{}", to_json_string(&module)?),
    }

    Ok(())
}
