use std::future::Future;

use tokio::sync::{watch, Mutex};

/// Coalesces concurrent identical operations into one execution: the first
/// caller runs the operation, everyone arriving while it is in flight awaits
/// the same settled value. The slot is cleared when the flight settles, so a
/// later call starts a fresh one.
pub struct Singleflight<T: Clone> {
    slot: Mutex<Option<watch::Receiver<Option<T>>>>,
}

impl<T: Clone> Default for Singleflight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Singleflight<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    pub async fn run<F, Fut>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let sender = {
            let mut slot = self.slot.lock().await;
            if let Some(receiver) = slot.as_ref().cloned() {
                drop(slot);
                return self.follow(receiver, operation).await;
            }
            let (sender, receiver) = watch::channel(None);
            *slot = Some(receiver);
            sender
        };

        let value = operation().await;
        let _ = sender.send(Some(value.clone()));
        // Settle: later callers must start a new flight, not observe this one.
        *self.slot.lock().await = None;
        value
    }

    async fn follow<F, Fut>(&self, mut receiver: watch::Receiver<Option<T>>, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Ok(settled) = receiver.wait_for(|value| value.is_some()).await {
            if let Some(value) = settled.as_ref() {
                return value.clone();
            }
        }

        // The leader dropped without publishing (cancelled or panicked).
        // Clear the stale handle unless a new flight already replaced it,
        // then run the operation ourselves.
        {
            let mut slot = self.slot.lock().await;
            let stale = slot
                .as_ref()
                .map(|receiver| receiver.has_changed().is_err())
                .unwrap_or(false);
            if stale {
                *slot = None;
            }
        }
        operation().await
    }
}
