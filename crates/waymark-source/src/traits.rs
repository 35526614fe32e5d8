//! Position source trait

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use waymark_api::PositionSample;

use crate::SourceResult;

/// Delivery gate for a subscription: a sample is emitted only when at least
/// `min_time` has passed AND the position moved at least `min_distance`
/// meters since the last emitted sample. The first fix always passes.
#[derive(Debug, Clone, Copy)]
pub struct SubscribeOptions {
    pub min_time: Duration,
    pub min_distance: f64,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            min_time: Duration::from_secs(5),
            min_distance: 5.0,
        }
    }
}

/// Position source trait - implemented by platform-specific providers
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Begin delivering samples. The returned receiver yields samples
    /// serially, in fix order.
    async fn subscribe(
        &self,
        options: SubscribeOptions,
    ) -> SourceResult<mpsc::UnboundedReceiver<PositionSample>>;

    /// Stop delivering samples and close the channel.
    async fn unsubscribe(&self) -> SourceResult<()>;

    /// Optional: check if the source is healthy
    fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_options_default() {
        let options = SubscribeOptions::default();
        assert_eq!(options.min_time, Duration::from_secs(5));
        assert_eq!(options.min_distance, 5.0);
    }
}
