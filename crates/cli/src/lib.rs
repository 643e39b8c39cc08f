mod cache;
mod classes;
mod scripts;

use clap::{Parser, Subcommand};
use groovyscope_core::EngineConfig;
use std::path::{Path, PathBuf};

pub use cache::CacheCommands;

#[derive(Parser)]
#[command(
    name = "groovyscope",
    version,
    about = "Inspect the indices behind the groovyscope definition engine",
    long_about = "groovyscope resolves Groovy references against open documents, named script units \
                  and the compiled classpath. These commands expose the classpath index, the script \
                  registry and the content cache without starting a language server."
)]
pub struct Cli {
    /// Engine configuration file (JSON). Missing keys use defaults.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the classpath index by simple-name prefix
    #[command(
        long_about = "Scans every classpath entry (jars, zips and class directories) and prints the \
                      classes whose simple name starts with PREFIX, ignoring case."
    )]
    Classes {
        #[arg(value_name = "PREFIX")]
        prefix: String,
        /// Classpath entry; may be repeated
        #[arg(long = "classpath", value_name = "PATH")]
        classpath: Vec<PathBuf>,
        /// Add every jar below this directory to the classpath
        #[arg(long, value_name = "DIR")]
        lib_dir: Option<PathBuf>,
        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List named script units (`vars/<name>.groovy`)
    Scripts {
        /// Shared library roots; defaults to the configured roots
        #[arg(value_name = "ROOT")]
        roots: Vec<PathBuf>,
        /// Only show the unit with this name
        #[arg(long)]
        name: Option<String>,
    },
    /// Manage the content-addressed cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = groovyscope_core::logging::init_logging("cli", true);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Classes {
            prefix,
            classpath,
            lib_dir,
            limit,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(classes::run(config, prefix, classpath, lib_dir, limit))
        }
        Commands::Scripts { roots, name } => scripts::run(config, roots, name),
        Commands::Cache { command } => cache::run(config, command),
    }
}
