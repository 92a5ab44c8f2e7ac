//! Client-side keepalive for a gateway connection.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use super::connection::FrameSender;
use super::types::OutboundFrame;

/// Start sending `{"op":9}` every `period`, first ping one full `period` after the call.
///
/// The task stops when the handle is cancelled or dropped, or when `sender` reports the
/// connection gone. A failed send is not surfaced; the read loop sees the disconnect.
#[must_use = "dropping the handle stops the heartbeat"]
pub fn spawn(period: Duration, sender: FrameSender) -> HeartbeatHandle {
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // `interval` fires immediately; the server expects the first ping one period in.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = cancelled.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = sender.send(&OutboundFrame::ping()) {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(error = %e, "heartbeat stopped, connection gone");
                        #[cfg(not(feature = "tracing"))]
                        let _ = &e;
                        break;
                    }

                    #[cfg(feature = "tracing")]
                    tracing::trace!("heartbeat sent");
                }
            }
        }
    });

    HeartbeatHandle {
        token,
        task: Some(task),
        period,
    }
}

/// Owns a running heartbeat. At most one exists per connection; the session replaces it when a
/// new hello arrives.
#[derive(Debug)]
pub struct HeartbeatHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
    period: Duration,
}

impl HeartbeatHandle {
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the heartbeat without waiting for the task to exit.
    pub fn cancel(self) {
        self.token.cancel();
    }

    /// Stop the heartbeat and wait for the task to exit, so no ping is sent afterwards.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            _ = task.await;
        }
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
