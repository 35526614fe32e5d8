//! Mock position source for testing

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use waymark_api::PositionSample;

use crate::{PositionSource, SourceError, SourceResult, SubscribeOptions};

/// Mock position source for unit/integration testing.
///
/// Samples are pushed by the test via [`MockPositionSource::emit`]; the mock
/// does no time/distance gating of its own.
pub struct MockPositionSource {
    sender: Mutex<Option<mpsc::UnboundedSender<PositionSample>>>,
    last_options: Mutex<Option<SubscribeOptions>>,
    subscribes: AtomicU64,
    unsubscribes: AtomicU64,

    /// Configure subscribe to fail
    pub fail_subscribe: Mutex<bool>,
}

impl MockPositionSource {
    pub fn new() -> Self {
        Self {
            sender: Mutex::new(None),
            last_options: Mutex::new(None),
            subscribes: AtomicU64::new(0),
            unsubscribes: AtomicU64::new(0),
            fail_subscribe: Mutex::new(false),
        }
    }

    /// Deliver a sample to the current subscriber. Returns false when no
    /// subscription is active or the receiver is gone.
    pub fn emit(&self, sample: PositionSample) -> bool {
        match self.sender.lock().unwrap().as_ref() {
            Some(tx) => tx.send(sample).is_ok(),
            None => false,
        }
    }

    pub fn subscribe_count(&self) -> u64 {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_count(&self) -> u64 {
        self.unsubscribes.load(Ordering::SeqCst)
    }

    /// Options passed to the most recent subscribe call
    pub fn last_options(&self) -> Option<SubscribeOptions> {
        *self.last_options.lock().unwrap()
    }
}

impl Default for MockPositionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PositionSource for MockPositionSource {
    async fn subscribe(
        &self,
        options: SubscribeOptions,
    ) -> SourceResult<mpsc::UnboundedReceiver<PositionSample>> {
        if *self.fail_subscribe.lock().unwrap() {
            return Err(SourceError::SubscribeFailed("simulated failure".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock().unwrap() = Some(tx);
        *self.last_options.lock().unwrap() = Some(options);
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        Ok(rx)
    }

    async fn unsubscribe(&self) -> SourceResult<()> {
        // Dropping the sender closes the channel
        match self.sender.lock().unwrap().take() {
            Some(_) => {
                self.unsubscribes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(SourceError::NotSubscribed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::time::Duration;

    #[tokio::test]
    async fn emit_reaches_subscriber() {
        let source = MockPositionSource::new();
        let mut rx = source.subscribe(SubscribeOptions::default()).await.unwrap();

        assert!(source.emit(PositionSample::new(1.0, 2.0, Local::now())));

        let sample = rx.recv().await.unwrap();
        assert_eq!(sample.latitude, 1.0);
    }

    #[tokio::test]
    async fn unsubscribe_closes_channel() {
        let source = MockPositionSource::new();
        let mut rx = source.subscribe(SubscribeOptions::default()).await.unwrap();

        source.unsubscribe().await.unwrap();

        assert!(rx.recv().await.is_none());
        assert!(!source.emit(PositionSample::new(1.0, 2.0, Local::now())));
    }

    #[tokio::test]
    async fn unsubscribe_without_subscription_errors() {
        let source = MockPositionSource::new();
        assert!(matches!(
            source.unsubscribe().await,
            Err(SourceError::NotSubscribed)
        ));
    }

    #[tokio::test]
    async fn fail_subscribe_switch() {
        let source = MockPositionSource::new();
        *source.fail_subscribe.lock().unwrap() = true;

        assert!(source.subscribe(SubscribeOptions::default()).await.is_err());
        assert_eq!(source.subscribe_count(), 0);
    }

    #[tokio::test]
    async fn options_are_recorded() {
        let source = MockPositionSource::new();
        let options = SubscribeOptions {
            min_time: Duration::from_millis(250),
            min_distance: 1.5,
        };
        let _rx = source.subscribe(options).await.unwrap();

        let seen = source.last_options().unwrap();
        assert_eq!(seen.min_time, Duration::from_millis(250));
        assert_eq!(seen.min_distance, 1.5);
    }
}
