use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use idlc_compiler::error::IdlError;
use idlc_compiler::scanner::DEFAULT_EXTENSION;
use idlc_compiler::{check_project_uniqueness, compile_source, scan, validate, validate_all, ScanConfig};

#[derive(Parser)]
#[command(name = "idlc")]
#[command(about = "Parse and validate .idl interface definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a single `.idl` file and print its AST as JSON
    Parse {
        /// Input `.idl` file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Parse and validate every `.idl` file below a directory
    Check {
        /// Source directory
        #[arg(short, long)]
        input: PathBuf,

        /// Extension of the files to pick up
        #[arg(short, long, default_value = DEFAULT_EXTENSION)]
        extension: String,

        /// Also require type names to be unique per package across files
        #[arg(long)]
        project_unique: bool,
    },
}

fn main() -> Result<(), IdlError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Parse { input } => {
            let text = fs::read_to_string(input)?;
            let name = input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let item = compile_source(&name, &input.display().to_string(), &text)?;
            let json = serde_json::to_string_pretty(&item.file)?;
            println!("{}", json);
            Ok(())
        }

        Commands::Check { input, extension, project_unique } => {
            let config = ScanConfig::new(input).with_extension(extension.as_str());
            let report = scan(&config)?;
            for failure in &report.failures {
                println!("parse error: {}", failure);
            }
            let files = report.into_result()?;

            let files = match validate_all(files.into_iter().map(validate)) {
                Ok(files) => files,
                Err(invalid) => {
                    for item in &invalid {
                        println!("validation error: {}", item);
                    }
                    return Err(IdlError::ValidationFailures(invalid));
                }
            };

            if *project_unique {
                if let Err(duplicates) = check_project_uniqueness(&files) {
                    for duplicate in &duplicates {
                        println!("validation error: {}", duplicate);
                    }
                    return Err(IdlError::DuplicateAcrossFiles(duplicates));
                }
            }

            println!("OK: {} file(s) parsed and validated.", files.len());
            Ok(())
        }
    }
}
