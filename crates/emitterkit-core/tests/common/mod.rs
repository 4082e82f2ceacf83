//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

/// Counts warn and error diagnostics
#[derive(Clone, Default)]
pub struct LevelCounter {
    warn: Arc<AtomicUsize>,
    error: Arc<AtomicUsize>,
}

impl LevelCounter {
    pub fn warnings(&self) -> usize {
        self.warn.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> usize {
        self.error.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for LevelCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        match *event.metadata().level() {
            Level::WARN => {
                self.warn.fetch_add(1, Ordering::SeqCst);
            }
            Level::ERROR => {
                self.error.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }
    }
}

/// Run `f` with a counting subscriber installed on the current thread
pub fn count_diagnostics<R>(f: impl FnOnce() -> R) -> (R, LevelCounter) {
    let counter = LevelCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, counter)
}

/// Shared, ordered record of observed values
pub type Recorder<T> = Arc<parking_lot::Mutex<Vec<T>>>;

pub fn recorder<T>() -> Recorder<T> {
    Arc::new(parking_lot::Mutex::new(Vec::new()))
}
