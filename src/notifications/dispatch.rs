use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::task::TaskTracker;

use crate::error::RelayError;
use crate::model::{DeliveryOutcome, PushMessage};
use crate::notifications::NotificationProvider;

const OUTCOME_CHANNEL_CAPACITY: usize = 64;

/// Delivers messages in the background after a fixed delay.
///
/// Callers get a [`DispatchHandle`] back immediately and are free to drop it;
/// the outcome is logged and published to every [`subscribe`](Self::subscribe)r either way.
#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn NotificationProvider>,
    delay: Duration,
    outcomes: broadcast::Sender<DeliveryOutcome>,
    in_flight: TaskTracker,
}

/// Handle to one in-flight delivery
pub struct DispatchHandle {
    task: JoinHandle<Result<String, RelayError>>,
}

impl DispatchHandle {
    /// Wait for the delivery to finish
    pub async fn outcome(self) -> Result<String, RelayError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(RelayError::DeliveryError(format!("delivery task failed: {e}"))),
        }
    }
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn NotificationProvider>, delay: Duration) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            provider,
            delay,
            outcomes,
            in_flight: TaskTracker::new(),
        }
    }

    /// Deliveries that have not finished yet
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Wait up to `grace` for in-flight deliveries at shutdown.
    /// Returns how many were still pending and are abandoned.
    pub async fn drain(&self, grace: Duration) -> usize {
        self.in_flight.close();

        let pending = self.in_flight.len();
        if pending == 0 {
            return 0;
        }
        info!(
            "Waiting up to {:?} for {} pending notification deliveries",
            grace, pending
        );

        if timeout(grace, self.in_flight.wait()).await.is_ok() {
            info!("All pending notification deliveries finished");
            return 0;
        }

        let abandoned = self.in_flight.len();
        warn!(
            "Abandoning {} notification deliveries still pending at shutdown",
            abandoned
        );
        abandoned
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeliveryOutcome> {
        self.outcomes.subscribe()
    }

    pub fn dispatch(&self, message: PushMessage) -> DispatchHandle {
        let provider = Arc::clone(&self.provider);
        let outcomes = self.outcomes.clone();
        let delay = self.delay;

        let task = self.in_flight.spawn(async move {
            sleep(delay).await;

            let result = provider.send(&message).await;
            match &result {
                Ok(message_id) => info!(
                    "Successfully sent message via {}: {}",
                    provider.provider_name(),
                    message_id
                ),
                Err(e) => error!("Error sending notification: {}", e),
            }

            let outcome = DeliveryOutcome {
                token: message.token,
                result: result.as_ref().map(Clone::clone).map_err(ToString::to_string),
            };
            if outcomes.send(outcome).is_err() {
                debug!("No delivery outcome subscribers");
            }

            result
        });

        DispatchHandle { task }
    }
}
