mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{LifecycleSettings, LivenessSettings, ServerSettings, Settings};


/// Loads the configuration from the default file and environment variables.
/// Merges the loaded values with defaults and returns the complete
/// `Settings`.
///
/// Environment variables use `__` between section and key, for example
/// `SERVER__PORT` or `LIVENESS__POLICY`. A bare `PORT` variable also sets
/// the listening port and wins over `SERVER__PORT`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let _ = dotenvy::dotenv();

    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("__").try_parsing(true));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    let port_override = std::env::var("PORT").ok().and_then(|p| p.parse().ok());

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: port_override
                .or_else(|| partial.server.as_ref().and_then(|s| s.port))
                .unwrap_or(default.server.port),
        },
        lifecycle: LifecycleSettings {
            persistent: partial
                .lifecycle
                .as_ref()
                .and_then(|l| l.persistent)
                .unwrap_or(default.lifecycle.persistent),
            max_lifetime_secs: partial
                .lifecycle
                .as_ref()
                .and_then(|l| l.max_lifetime_secs),
        },
        liveness: LivenessSettings {
            policy: partial
                .liveness
                .as_ref()
                .and_then(|l| l.policy)
                .unwrap_or(default.liveness.policy),
            heartbeat_interval_secs: partial
                .liveness
                .as_ref()
                .and_then(|l| l.heartbeat_interval_secs)
                .unwrap_or(default.liveness.heartbeat_interval_secs),
            ttl_window_secs: partial
                .liveness
                .as_ref()
                .and_then(|l| l.ttl_window_secs)
                .unwrap_or(default.liveness.ttl_window_secs),
            sweep_interval_secs: partial
                .liveness
                .as_ref()
                .and_then(|l| l.sweep_interval_secs)
                .unwrap_or(default.liveness.sweep_interval_secs),
        },
    })
}
