//! Host allocation for build units

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tagship_core::{PipelineError, PipelineResult};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Runner capacity per execution environment class, plus a global cap
#[derive(Clone)]
pub struct RunnerPool {
    classes: Arc<Mutex<HashMap<String, Arc<Semaphore>>>>,
    global: Option<Arc<Semaphore>>,
}

/// Held by a unit for as long as it occupies a runner
#[derive(Debug)]
pub struct RunnerPermit {
    _class: OwnedSemaphorePermit,
    _global: Option<OwnedSemaphorePermit>,
}

impl RunnerPool {
    /// `max_parallel == 0` means no global cap
    pub fn new(max_parallel: usize) -> Self {
        Self {
            classes: Arc::new(Mutex::new(HashMap::new())),
            global: (max_parallel > 0).then(|| Arc::new(Semaphore::new(max_parallel))),
        }
    }

    pub fn with_capacity(self, environment: impl Into<String>, capacity: usize) -> Self {
        self.classes
            .lock()
            .insert(environment.into(), Arc::new(Semaphore::new(capacity.max(1))));
        self
    }

    /// Classes without a configured capacity get one runner
    fn class(&self, environment: &str) -> Arc<Semaphore> {
        self.classes
            .lock()
            .entry(environment.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone()
    }

    /// Wait for a free runner of the given class
    pub async fn acquire(&self, environment: &str) -> PipelineResult<RunnerPermit> {
        let class = self
            .class(environment)
            .acquire_owned()
            .await
            .map_err(|_| PipelineError::Cancelled)?;

        let global = match &self.global {
            Some(sem) => Some(
                sem.clone()
                    .acquire_owned()
                    .await
                    .map_err(|_| PipelineError::Cancelled)?,
            ),
            None => None,
        };

        Ok(RunnerPermit {
            _class: class,
            _global: global,
        })
    }

    #[cfg(test)]
    fn available(&self, environment: &str) -> usize {
        self.class(environment).available_permits()
    }
}

impl Default for RunnerPool {
    fn default() -> Self {
        Self::new(0)
    }
}
