use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use better_reflection::source_locator::ClosureLocation;
use better_reflection::{BetterReflection, ReflectionConfig};

/// Reflect PHP classes, functions and constants without running PHP.
#[derive(Parser, Debug)]
#[command(name = "better-reflection", version, about)]
struct Cli {
    /// Project root; `composer.json` and `better-reflection.toml` are read from here
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Configuration file to use instead of `<root>/better-reflection.toml`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not resolve built-in symbols from phpstorm-stubs
    #[arg(long)]
    no_stubs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a class, interface, trait or enum
    Class { name: String },
    /// Print a function
    Function { name: String },
    /// Print a global constant
    Constant { name: String },
    /// Print every declaration in a file
    List { file: PathBuf },
    /// Print the closure that starts on a line
    Closure { file: PathBuf, line: usize },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> better_reflection::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ReflectionConfig::load_from(path)?,
        None => ReflectionConfig::load(&cli.root)?,
    };
    if cli.no_stubs {
        config.stubs = false;
    }
    let reflection = BetterReflection::new(&cli.root, config)?;

    match cli.command {
        Command::Class { name } => {
            println!("{}", reflection.class_reflector().reflect(&name)?);
        }
        Command::Function { name } => {
            println!("{}", reflection.function_reflector().reflect(&name)?);
        }
        Command::Constant { name } => {
            println!("{}", reflection.constant_reflector().reflect(&name)?);
        }
        Command::List { file } => {
            for declaration in reflection.reflect_file(&file)? {
                println!("{}\n", declaration);
            }
        }
        Command::Closure { file, line } => {
            let location = ClosureLocation::new(file.to_string_lossy(), line);
            println!("{}", reflection.reflect_closure(Arc::new(location))?);
        }
    }
    Ok(())
}
