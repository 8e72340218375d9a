use std::time::Duration;

use serde::Deserialize;

use crate::liveness::{LivenessKind, LivenessPolicy};

/// Top-level configuration settings for the relay.
///
/// Includes the listening address, the process lifetime policy, and the
/// connection liveness policy.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub lifecycle: LifecycleSettings,
    pub liveness: LivenessSettings,
}

/// Configuration settings for the server.
///
/// Defines the host and port the relay will bind to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Configuration settings for the process lifetime.
#[derive(Debug, Deserialize, Clone)]
pub struct LifecycleSettings {
    /// Keep serving with zero open connections. Ephemeral deployments set
    /// this to false so the process exits when the last client leaves.
    pub persistent: bool,
    /// Hard cap on process lifetime, in seconds. Unset disables the cap.
    pub max_lifetime_secs: Option<u64>,
}

impl LifecycleSettings {
    pub fn max_lifetime(&self) -> Option<Duration> {
        self.max_lifetime_secs.map(Duration::from_secs)
    }
}

/// Configuration settings for connection liveness.
///
/// `policy` picks the strategy; the remaining fields tune whichever
/// strategy is active and are ignored by the other one.
#[derive(Debug, Deserialize, Clone)]
pub struct LivenessSettings {
    pub policy: LivenessKind,
    pub heartbeat_interval_secs: u64,
    pub ttl_window_secs: u64,
    pub sweep_interval_secs: u64,
}

impl LivenessSettings {
    /// The per-connection policy value handed to the transport.
    pub fn to_policy(&self) -> LivenessPolicy {
        match self.policy {
            LivenessKind::Heartbeat => LivenessPolicy::Heartbeat {
                interval: Duration::from_secs(self.heartbeat_interval_secs),
            },
            LivenessKind::SlidingTtl => LivenessPolicy::SlidingTtl {
                window: Duration::from_secs(self.ttl_window_secs),
                sweep_interval: Duration::from_secs(self.sweep_interval_secs),
            },
        }
    }
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values are filled from
/// defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub lifecycle: Option<PartialLifecycleSettings>,
    pub liveness: Option<PartialLivenessSettings>,
}

/// Partial server settings.
#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Partial lifecycle settings.
#[derive(Debug, Deserialize)]
pub struct PartialLifecycleSettings {
    pub persistent: Option<bool>,
    pub max_lifetime_secs: Option<u64>,
}

/// Partial liveness settings.
#[derive(Debug, Deserialize)]
pub struct PartialLivenessSettings {
    pub policy: Option<LivenessKind>,
    pub heartbeat_interval_secs: Option<u64>,
    pub ttl_window_secs: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
}

/// Provides default values for `Settings`.
///
/// The defaults bind every interface on port 4444, run the heartbeat policy
/// at 30 seconds, and keep the process alive indefinitely.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 4444,
            },
            lifecycle: LifecycleSettings {
                persistent: true,
                max_lifetime_secs: None,
            },
            liveness: LivenessSettings {
                policy: LivenessKind::Heartbeat,
                heartbeat_interval_secs: 30,
                ttl_window_secs: 60,
                sweep_interval_secs: 10,
            },
        }
    }
}
