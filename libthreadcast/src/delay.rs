//! Pauses between campaign steps
//!
//! The sequencer never sleeps directly; it asks a [`Delay`] to wait. Real
//! runs use [`TokioDelay`], tests use [`NoDelay`] or [`RecordingDelay`].

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[async_trait]
pub trait Delay: Send + Sync {
    /// Wait for `duration`. Not cancellable once started.
    async fn wait(&self, duration: Duration);
}

/// Wall-clock delay
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}

/// Returns immediately and remembers what it was asked to wait
#[derive(Debug, Default, Clone)]
pub struct RecordingDelay {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}
