//! Flash alert auto-dismissal

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::ui::DismissibleAlert;

pub const DEFAULT_DISMISS_DELAY: Duration = Duration::from_secs(5);

/// Closes every registered alert once, after a fixed delay.
pub struct AlertDismisser {
    alerts: Vec<Arc<dyn DismissibleAlert>>,
    delay: Duration,
}

impl AlertDismisser {
    pub fn new(delay: Duration) -> Self {
        Self {
            alerts: Vec::new(),
            delay,
        }
    }

    pub fn register(&mut self, alert: Arc<dyn DismissibleAlert>) {
        self.alerts.push(alert);
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Start the timer. The handle yields how many alerts were closed.
    pub fn spawn(self) -> JoinHandle<usize> {
        tokio::spawn(async move {
            tokio::time::sleep(self.delay).await;
            for alert in &self.alerts {
                alert.close();
            }
            tracing::debug!(count = self.alerts.len(), "Alerts dismissed");
            self.alerts.len()
        })
    }
}

impl Default for AlertDismisser {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_DELAY)
    }
}
