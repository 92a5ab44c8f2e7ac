#![expect(
    clippy::module_name_repetitions,
    reason = "Configuration types intentionally mirror the module name for clarity"
)]

use std::time::Duration;

use backoff::backoff::{Backoff, Constant};
use backoff::ExponentialBackoffBuilder;

/// Fixed wait between a disconnect and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_INITIAL_BACKOFF_DURATION: Duration = Duration::from_secs(1);
const DEFAULT_MAX_BACKOFF_DURATION: Duration = Duration::from_secs(60);
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Configuration for gateway session behavior.
///
/// The heartbeat interval is not configurable: the server dictates it in its hello frame.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Reconnection policy
    pub reconnect: ReconnectConfig,
}

impl Config {
    #[must_use]
    pub fn with_reconnect(reconnect: ReconnectConfig) -> Self {
        Self { reconnect }
    }
}

/// Whether, and how long after a disconnect, the session reconnects.
///
/// Reconnection is unbounded: there is no attempt cap.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// When `false`, `run()` returns as soon as the socket closes or errors
    pub enabled: bool,
    /// Wait between attempts
    pub backoff: BackoffStrategy,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self::constant(DEFAULT_RECONNECT_DELAY)
    }
}

impl ReconnectConfig {
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Reconnect forever, waiting `delay` before each attempt.
    #[must_use]
    pub fn constant(delay: Duration) -> Self {
        Self {
            enabled: true,
            backoff: BackoffStrategy::Constant(delay),
        }
    }

    /// Reconnect forever with jittered exponential backoff (1s doubling up to 60s).
    #[must_use]
    pub fn exponential() -> Self {
        Self {
            enabled: true,
            backoff: BackoffStrategy::Exponential {
                initial: DEFAULT_INITIAL_BACKOFF_DURATION,
                max: DEFAULT_MAX_BACKOFF_DURATION,
                multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            },
        }
    }

    pub(crate) fn backoff(&self) -> Box<dyn Backoff + Send> {
        match self.backoff {
            BackoffStrategy::Constant(delay) => Box::new(Constant::new(delay)),
            BackoffStrategy::Exponential {
                initial,
                max,
                multiplier,
            } => Box::new(
                ExponentialBackoffBuilder::default()
                    .with_initial_interval(initial)
                    .with_max_interval(max)
                    .with_multiplier(multiplier)
                    .with_max_elapsed_time(None)
                    .build(),
            ),
        }
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackoffStrategy {
    /// Same delay before every attempt, no jitter
    Constant(Duration),
    /// Jittered exponential growth from `initial`, capped at `max`
    Exponential {
        initial: Duration,
        max: Duration,
        multiplier: f64,
    },
}
