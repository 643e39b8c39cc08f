use groovyscope_core::EngineConfig;
use groovyscope_core::external::{ScriptRegistry, VarsDirectoryRegistry};
use std::path::PathBuf;

pub fn run(
    config: EngineConfig,
    roots: Vec<PathBuf>,
    name: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let roots = if roots.is_empty() {
        config.script_roots
    } else {
        roots
    };
    let registry = VarsDirectoryRegistry::new(roots);

    match name {
        Some(name) => match registry.lookup(&name) {
            Some(path) => println!("{} -> {}", name, path.display()),
            None => println!("No script unit named '{}'.", name),
        },
        None => {
            let names = registry.names();
            if names.is_empty() {
                println!("No script units found.");
            }
            for name in names {
                if let Some(path) = registry.lookup(&name) {
                    println!("{} -> {}", name, path.display());
                }
            }
        }
    }
    Ok(())
}
