use groovyscope_core::external::{DependencyResolver, LibDirectoryResolver};
use groovyscope_core::{Engine, EngineConfig};
use std::path::PathBuf;
use tabled::{Table, Tabled};
use tracing::info;

#[derive(Tabled)]
struct ClassRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "FQN")]
    fqn: String,
    #[tabled(rename = "Archive")]
    archive: String,
}

pub async fn run(
    mut config: EngineConfig,
    prefix: String,
    mut classpath: Vec<PathBuf>,
    lib_dir: Option<PathBuf>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    // The scan happens right below; no need for a background one.
    config.eager_classpath_indexing = false;
    let engine = Engine::builder(config).build();

    if let Some(dir) = lib_dir {
        classpath.extend(LibDirectoryResolver::new(dir).resolve()?);
    }
    info!("Indexing {} classpath entries...", classpath.len());
    engine.update_classpath(classpath);
    let total = engine.index_classpath().await?;
    info!("Classpath index ready: {} classes", total);

    let rows: Vec<ClassRow> = engine
        .find_classes(&prefix, limit)
        .into_iter()
        .map(|entry| ClassRow {
            name: entry.simple_name,
            fqn: entry.fqn,
            archive: entry.archive.display().to_string(),
        })
        .collect();

    if rows.is_empty() {
        println!("No classes match '{}'.", prefix);
    } else {
        println!("{}", Table::new(rows));
    }
    Ok(())
}
