use pubsub_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

/// Main pubsub configuration
///
/// Configuration is loaded from (in priority order):
/// 1. `pubsub.jsonc` - JSON with comments
/// 2. `pubsub.json` - Standard JSON
/// 3. `pubsub.yml` / `pubsub.yaml` - YAML format
///
/// Also checks hidden variants (`.pubsub.*`) and `~/.config/pubsub/` for global config.
///
/// # Example
///
/// ```yaml
/// events:
///   - signin
///   - signout
/// telemetry:
///   level: debug
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PubsubConfig {
    /// Event names known to the registry before anything subscribes.
    /// `default` is always known and need not be listed.
    #[serde(default)]
    pub events: Vec<String>,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
