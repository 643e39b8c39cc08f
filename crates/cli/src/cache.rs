use clap::Subcommand;
use groovyscope_core::EngineConfig;
use groovyscope_core::cache::ContentCache;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Store a file in the cache and print the cached path
    Put {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the cache directory
    Dir,
    /// Remove every cached artifact
    Clear,
}

pub fn run(config: EngineConfig, cmd: CacheCommands) -> Result<(), Box<dyn std::error::Error>> {
    let cache = ContentCache::new(config.cache_dir);

    match cmd {
        CacheCommands::Put { file } => {
            let content = std::fs::read(&file)?;
            let extension = file
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default();
            let path = cache.get_or_create(&content, extension)?;
            println!("{}", path.display());
        }
        CacheCommands::Dir => {
            println!("{}", cache.root().display());
        }
        CacheCommands::Clear => {
            let removed = cache.clear()?;
            println!("Removed {} cached artifacts.", removed);
        }
    }
    Ok(())
}
