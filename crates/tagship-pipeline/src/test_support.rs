//! Fakes shared by the unit tests of this crate

use crate::artifact::RawBinary;
use crate::executor::BuildExecutor;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tagship_core::{PipelineError, PipelineResult, Platform, TargetDescriptor};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

#[derive(Clone)]
pub enum Behavior {
    Succeed,
    Fail,
    Empty,
    Delay(Duration),
    DelayThenFail(Duration),
    Hang,
}

/// Executor whose result per platform is scripted by the test
#[derive(Default)]
pub struct ScriptedExecutor {
    behaviors: HashMap<Platform, Behavior>,
    pub started: Mutex<Vec<Platform>>,
    pub finished: Mutex<Vec<Platform>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, platform: Platform, behavior: Behavior) -> Self {
        self.behaviors.insert(platform, behavior);
        self
    }

    pub fn started(&self) -> Vec<Platform> {
        self.started.lock().clone()
    }

    pub fn finished(&self) -> Vec<Platform> {
        self.finished.lock().clone()
    }
}

#[async_trait]
impl BuildExecutor for ScriptedExecutor {
    async fn build(&self, target: &TargetDescriptor) -> PipelineResult<RawBinary> {
        self.started.lock().push(target.platform);
        let behavior = self
            .behaviors
            .get(&target.platform)
            .cloned()
            .unwrap_or(Behavior::Succeed);

        let result = match behavior {
            Behavior::Succeed => Ok(binary(target)),
            Behavior::Fail => Err(PipelineError::build_failure(&target.triple, "scripted failure")),
            Behavior::Empty => Ok(RawBinary::new(target.clone(), Vec::new())),
            Behavior::Delay(d) => {
                tokio::time::sleep(d).await;
                Ok(binary(target))
            }
            Behavior::DelayThenFail(d) => {
                tokio::time::sleep(d).await;
                Err(PipelineError::build_failure(&target.triple, "scripted failure"))
            }
            Behavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };
        self.finished.lock().push(target.platform);
        result
    }
}

fn binary(target: &TargetDescriptor) -> RawBinary {
    RawBinary::new(
        target.clone(),
        format!("binary for {}", target.triple).into_bytes(),
    )
}

/// Layer counting the warnings logged while it is installed
#[derive(Clone, Default)]
pub struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }
}
