#![forbid(unsafe_code)]

//! Static discovery of the REST surface of compiled Java artifacts.
//!
//! The pipeline: project locations are indexed into a [`ClassPool`];
//! classes carrying a path-binding or application-path annotation seed the
//! [`JobRegistry`]; each pending class is analyzed (annotations, field and
//! parameter bindings, supertype inheritance); every REST method's body is
//! abstractly interpreted for status codes, headers, and entity types; and
//! the results fold into a sorted [`Resources`] tree.

mod analyzer;
mod enrich;
mod extract;
mod interp;
mod registry;
mod resources;
mod roots;
mod supertype;
mod vocab;

use std::path::PathBuf;
use std::sync::Mutex;

use apimap_classfile::ClassFile;
use apimap_classpool::{ClassPool, PoolError};
use apimap_model::Resources;
use thiserror::Error;

pub use crate::enrich::{DocEnricher, NoopEnricher};
pub use crate::interp::DEFAULT_ITERATION_CAP;
pub use crate::registry::JobRegistry;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("malformed class file {name}")]
    MalformedClassFile {
        name: String,
        #[source]
        source: apimap_classfile::Error,
    },
}

/// Inputs to one analyze call.
#[derive(Clone, Debug, Default)]
pub struct AnalysisRequest {
    /// Artifacts scanned for REST-eligible classes.
    pub project_class_paths: Vec<PathBuf>,
    /// Source directories handed to the documentation enricher.
    pub project_source_paths: Vec<PathBuf>,
    /// Artifacts resolvable for supertype and call-target lookups only.
    pub dependency_class_paths: Vec<PathBuf>,
}

struct PoolState {
    pool: ClassPool,
    platform_loaded: bool,
}

/// Top-level analyzer. `analyze` is mutually exclusive: concurrent callers
/// serialize on one lock held for the entire call. The class pool is the
/// only state that survives across calls.
pub struct RestAnalyzer {
    state: Mutex<PoolState>,
    enricher: Box<dyn DocEnricher>,
    iteration_cap: u32,
    platform_classpath: bool,
}

impl Default for RestAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl RestAnalyzer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PoolState {
                pool: ClassPool::new(),
                platform_loaded: false,
            }),
            enricher: Box::new(NoopEnricher),
            iteration_cap: DEFAULT_ITERATION_CAP,
            platform_classpath: true,
        }
    }

    pub fn with_enricher(mut self, enricher: Box<dyn DocEnricher>) -> Self {
        self.enricher = enricher;
        self
    }

    /// Disable registration of the host JDK as dependency locations.
    pub fn without_platform_classpath(mut self) -> Self {
        self.platform_classpath = false;
        self
    }

    pub fn with_iteration_cap(mut self, cap: u32) -> Self {
        self.iteration_cap = cap;
        self
    }

    pub fn analyze(&self, request: &AnalysisRequest) -> Result<Resources, AnalysisError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        for path in &request.project_class_paths {
            state.pool.add_project(path)?;
        }
        for path in &request.dependency_class_paths {
            state.pool.add_dependency(path)?;
        }
        if self.platform_classpath && !state.platform_loaded {
            state.pool.add_platform_library();
            state.platform_loaded = true;
        }
        let pool = &state.pool;

        let registry = JobRegistry::new();
        let project_classes: Vec<String> = pool.class_names().map(str::to_string).collect();
        for name in &project_classes {
            let bytes = pool.read_class(name)?;
            let class =
                ClassFile::parse(&bytes).map_err(|source| AnalysisError::MalformedClassFile {
                    name: name.clone(),
                    source,
                })?;
            if roots::is_root(&class) {
                registry.enqueue(name);
            }
        }

        let analyzer = analyzer::ClassAnalyzer {
            pool,
            registry: &registry,
            iteration_cap: self.iteration_cap,
        };
        while let Some((name, mut result)) = registry.next_pending() {
            analyzer.analyze(&name, &mut result)?;
            registry.mark_done(&name, result);
        }

        let mut results = registry.into_results();
        let packages: Vec<String> = pool.package_names().map(str::to_string).collect();
        self.enricher
            .enrich(&mut results, &packages, &request.project_source_paths, pool);

        Ok(resources::interpret(&results))
    }
}
