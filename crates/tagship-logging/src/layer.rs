//! Console subscriber and run event tallies

use crate::reload::{ReloadHandle, level_filter};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tagship_core::LogLevel;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Tracing layer that counts warning and error events.
///
/// Clones share the same tallies, so the CLI keeps one clone and installs
/// the other in the subscriber.
#[derive(Debug, Clone, Default)]
pub struct RunEventCounter {
    counts: Arc<Counts>,
}

#[derive(Debug, Default)]
struct Counts {
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

impl RunEventCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> usize {
        self.counts.warnings.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> usize {
        self.counts.errors.load(Ordering::Relaxed)
    }

    fn record(&self, level: &Level) {
        match *level {
            Level::WARN => {
                self.counts.warnings.fetch_add(1, Ordering::Relaxed);
            }
            Level::ERROR => {
                self.counts.errors.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }
}

impl<S> Layer<S> for RunEventCounter
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.record(event.metadata().level());
    }
}

/// Install the global console subscriber.
///
/// Logs go to stderr so `--json` output on stdout stays machine-readable.
/// When `RUST_LOG` is set it decides what is shown: `level` is ignored and
/// later [`crate::apply_level`] calls have no effect. Returns the counter
/// wired into the subscriber; calling this twice keeps the first subscriber
/// and returns a detached counter.
pub fn init_logging(level: LogLevel) -> RunEventCounter {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let env_filter = EnvFilter::try_from_default_env().ok();
    let env_governed = env_filter.is_some();
    let initial = if env_governed {
        tracing_subscriber::filter::LevelFilter::TRACE
    } else {
        level_filter(level)
    };

    let (filter, handle) = tracing_subscriber::reload::Layer::new(initial);
    let counter = RunEventCounter::new();

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(counter.clone());

    if tracing::subscriber::set_global_default(subscriber).is_ok() && !env_governed {
        ReloadHandle::global().set_handle(handle);
    }

    counter
}
