use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use apimap_model::ClassResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum JobStatus {
    Pending,
    InProgress,
    Done,
}

#[derive(Default)]
struct Inner {
    queue: VecDeque<String>,
    status: HashMap<String, JobStatus>,
    results: HashMap<String, ClassResult>,
}

/// Work pool of classes awaiting analysis. FIFO relative to first enqueue,
/// deduplicated by binary name. While a job is in progress its
/// `ClassResult` is owned exclusively by the caller and handed back via
/// [`JobRegistry::mark_done`].
#[derive(Default)]
pub struct JobRegistry {
    inner: Mutex<Inner>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the name was not yet known.
    pub fn enqueue(&self, binary_name: &str) -> bool {
        let mut inner = self.lock();
        if inner.status.contains_key(binary_name) {
            return false;
        }
        inner
            .status
            .insert(binary_name.to_string(), JobStatus::Pending);
        inner
            .results
            .insert(binary_name.to_string(), ClassResult::new(binary_name));
        inner.queue.push_back(binary_name.to_string());
        true
    }

    /// Atomically pop the oldest pending job and mark it in progress.
    pub fn next_pending(&self) -> Option<(String, ClassResult)> {
        let mut inner = self.lock();
        while let Some(name) = inner.queue.pop_front() {
            if inner.status.get(&name) != Some(&JobStatus::Pending) {
                continue;
            }
            inner.status.insert(name.clone(), JobStatus::InProgress);
            let result = inner
                .results
                .remove(&name)
                .unwrap_or_else(|| ClassResult::new(&name));
            return Some((name, result));
        }
        None
    }

    pub fn mark_done(&self, binary_name: &str, result: ClassResult) {
        let mut inner = self.lock();
        inner
            .status
            .insert(binary_name.to_string(), JobStatus::Done);
        inner.results.insert(binary_name.to_string(), result);
    }

    /// Consume the registry, yielding results sorted by binary name.
    pub fn into_results(self) -> Vec<ClassResult> {
        let inner = self.inner.into_inner().unwrap_or_else(|e| e.into_inner());
        let mut results: Vec<ClassResult> = inner.results.into_values().collect();
        results.sort_by(|a, b| a.binary_name.cmp(&b.binary_name));
        results
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
