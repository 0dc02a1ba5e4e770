use std::path::PathBuf;

use apimap_classpool::ClassPool;
use apimap_model::ClassResult;

/// Documentation enricher seam. Implementations merge source-derived
/// documentation (JavaDoc blocks) into the analysis results in place; the
/// analyzer itself never reads source files.
pub trait DocEnricher: Send + Sync {
    fn enrich(
        &self,
        class_results: &mut [ClassResult],
        packages: &[String],
        source_paths: &[PathBuf],
        pool: &ClassPool,
    );
}

/// Default enricher: leaves the results untouched.
pub struct NoopEnricher;

impl DocEnricher for NoopEnricher {
    fn enrich(
        &self,
        _class_results: &mut [ClassResult],
        _packages: &[String],
        _source_paths: &[PathBuf],
        _pool: &ClassPool,
    ) {
    }
}
