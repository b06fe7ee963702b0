//! Tokio runtime management

use crate::cancel::{CancelHandle, CancelSignal};
use std::sync::Arc;
use tagship_core::PipelineResult;
use tokio::runtime::{Builder, Runtime};

/// Configuration for the async runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads (None = number of CPU cores)
    pub worker_threads: Option<usize>,
    /// Name prefix for worker threads
    pub thread_name: String,
    /// Maximum blocking threads (file copies, checksum hashing)
    pub max_blocking_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            thread_name: "tagship-worker".to_string(),
            max_blocking_threads: 64,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// Owns the Tokio runtime and the cancellation handle of one pipeline run
pub struct PipelineRuntime {
    runtime: Arc<Runtime>,
    cancel: CancelHandle,
    config: RuntimeConfig,
}

impl PipelineRuntime {
    pub fn new(config: RuntimeConfig) -> PipelineResult<Self> {
        let mut builder = Builder::new_multi_thread();

        if let Some(threads) = config.worker_threads {
            builder.worker_threads(threads);
        }

        let runtime = builder
            .thread_name(&config.thread_name)
            .max_blocking_threads(config.max_blocking_threads)
            .enable_io()
            .enable_time()
            .build()?;

        Ok(Self {
            runtime: Arc::new(runtime),
            cancel: CancelHandle::new(),
            config,
        })
    }

    pub fn with_defaults() -> PipelineResult<Self> {
        Self::new(RuntimeConfig::default())
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.signal()
    }

    /// Cancel the run when the process receives Ctrl-C
    pub fn cancel_on_ctrl_c(&self) {
        let cancel = self.cancel.clone();
        self.runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received");
                cancel.trigger();
            }
        });
    }

    /// Block on a future from the synchronous CLI entry point
    pub fn block_on<F>(&self, future: F) -> F::Output
    where
        F: std::future::Future,
    {
        self.runtime.block_on(future)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_triggered()
    }
}

impl Drop for PipelineRuntime {
    fn drop(&mut self) {
        // In-flight units must not outlive the run
        self.cancel.trigger();
    }
}
