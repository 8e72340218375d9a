//! Connection liveness policies.
//!
//! A deployment runs exactly one of two strategies for reclaiming dead
//! connections. The heartbeat strategy sends a ping control frame every
//! interval and closes a connection that has not ponged by the next tick.
//! The sliding-TTL strategy gives each connection an expiry that protocol
//! activity pushes forward and a periodic sweep enforces.
//!
//! Per-connection state is a plain state machine driven with explicit
//! `Instant`s, so tests can run it on the paused tokio clock.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

/// Which liveness strategy a deployment runs. This is the configuration
/// surface; tuning lives in [`LivenessPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivenessKind {
    Heartbeat,
    SlidingTtl,
}

/// The selected strategy with its tuning, shared by every connection.
#[derive(Debug, Clone, Copy)]
pub enum LivenessPolicy {
    /// Ping every `interval`; a connection that has not ponged by the next
    /// tick is closed. Worst case, a dead connection lasts two intervals.
    Heartbeat { interval: Duration },
    /// Expire a connection `window` after its last dispatched envelope,
    /// checked every `sweep_interval`.
    SlidingTtl {
        window: Duration,
        sweep_interval: Duration,
    },
}

impl LivenessPolicy {
    /// Period of the per-connection ticker.
    pub fn check_period(&self) -> Duration {
        match self {
            LivenessPolicy::Heartbeat { interval } => *interval,
            LivenessPolicy::SlidingTtl { sweep_interval, .. } => *sweep_interval,
        }
    }
}

/// What the connection's read loop must do after a liveness tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing to do.
    Alive,
    /// Send a ping control frame.
    SendPing,
    /// Liveness is lost; close the connection.
    Expired,
}

/// Per-connection liveness state.
#[derive(Debug)]
pub enum Liveness {
    Heartbeat { pong_pending: bool },
    SlidingTtl { expires_at: Instant, window: Duration },
}

impl Liveness {
    pub fn new(policy: &LivenessPolicy, now: Instant) -> Self {
        match policy {
            LivenessPolicy::Heartbeat { .. } => Liveness::Heartbeat { pong_pending: false },
            LivenessPolicy::SlidingTtl { window, .. } => Liveness::SlidingTtl {
                expires_at: now + *window,
                window: *window,
            },
        }
    }

    /// Advances the state machine by one ticker period.
    pub fn on_tick(&mut self, now: Instant) -> Verdict {
        match self {
            Liveness::Heartbeat { pong_pending } => {
                if *pong_pending {
                    Verdict::Expired
                } else {
                    *pong_pending = true;
                    Verdict::SendPing
                }
            }
            Liveness::SlidingTtl { expires_at, .. } => {
                if now >= *expires_at {
                    Verdict::Expired
                } else {
                    Verdict::Alive
                }
            }
        }
    }

    /// Records a transport-level pong. Meaningless under the TTL policy.
    pub fn on_pong(&mut self) {
        if let Liveness::Heartbeat { pong_pending } = self {
            *pong_pending = false;
        }
    }

    /// Records a dispatched envelope, pushing the TTL expiry forward.
    /// Meaningless under the heartbeat policy.
    pub fn on_activity(&mut self, now: Instant) {
        if let Liveness::SlidingTtl { expires_at, window } = self {
            *expires_at = now + *window;
        }
    }
}

#[cfg(test)]
mod tests;
