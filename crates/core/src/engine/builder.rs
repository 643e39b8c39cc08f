use super::{Engine, Workspace};
use crate::cache::ContentCache;
use crate::classpath::{ArchiveScanner, ClasspathIndex, ClasspathScanner};
use crate::config::EngineConfig;
use crate::external::{
    ScriptRegistry, SourceExtractor, SourceParser, SourcesJarExtractor, VarsDirectoryRegistry,
};
use crate::resolve::{
    ClasspathStrategy, GlobalClassStrategy, LocalStrategy, NamedExternalStrategy,
    ResolutionPipeline, ResolutionStrategy,
};
use std::sync::Arc;

pub struct EngineBuilder {
    config: EngineConfig,
    parser: Option<Arc<dyn SourceParser>>,
    scanner: Option<Arc<dyn ClasspathScanner>>,
    extractor: Option<Arc<dyn SourceExtractor>>,
    scripts: Option<Arc<dyn ScriptRegistry>>,
    extra_strategies: Vec<Arc<dyn ResolutionStrategy>>,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            parser: None,
            scanner: None,
            extractor: None,
            scripts: None,
            extra_strategies: Vec::new(),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn SourceParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn ClasspathScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn SourceExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_scripts(mut self, scripts: Arc<dyn ScriptRegistry>) -> Self {
        self.scripts = Some(scripts);
        self
    }

    /// Runs after the default strategies.
    pub fn with_strategy(mut self, strategy: Arc<dyn ResolutionStrategy>) -> Self {
        self.extra_strategies.push(strategy);
        self
    }

    pub fn build(self) -> Engine {
        let config = self.config;
        let workspace = Arc::new(Workspace::new());
        let cache = Arc::new(ContentCache::new(config.cache_dir.clone()));
        let scanner = self.scanner.unwrap_or_else(|| Arc::new(ArchiveScanner));
        let classpath = Arc::new(ClasspathIndex::new(scanner));
        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(SourcesJarExtractor::new(cache.clone())));
        let scripts = self.scripts.unwrap_or_else(|| {
            Arc::new(VarsDirectoryRegistry::new(config.script_roots.clone()))
        });

        let depth = config.max_resolution_depth;
        let mut strategies: Vec<Arc<dyn ResolutionStrategy>> = vec![
            Arc::new(NamedExternalStrategy::new(scripts.clone())),
            Arc::new(LocalStrategy::new(depth)),
            Arc::new(GlobalClassStrategy::new(workspace.clone(), depth)),
            Arc::new(ClasspathStrategy::new(
                classpath.clone(),
                extractor,
                workspace.clone(),
                config.client_supports_archive_uris,
                depth,
            )),
        ];
        strategies.extend(self.extra_strategies);

        Engine {
            config,
            workspace,
            classpath,
            cache,
            scripts,
            parser: self.parser,
            pipeline: ResolutionPipeline::new(strategies),
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
