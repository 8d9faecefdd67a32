use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DOMAIN: &str = "api.riotgames.com";
pub const DEFAULT_PLATFORM: &str = "br1";
pub const DEFAULT_REGION: &str = "americas";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub capacity: u32,
    pub interval_secs: f64,
}

impl WindowConfig {
    pub fn new(capacity: u32, interval_secs: f64) -> Self {
        Self {
            capacity,
            interval_secs,
        }
    }

    pub fn interval(&self) -> Duration {
        secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub short: WindowConfig,
    pub long: WindowConfig,
    pub poll_interval_secs: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            short: WindowConfig::new(20, 1.0),
            long: WindowConfig::new(100, 120.0),
            poll_interval_secs: 1.0,
        }
    }
}

impl GateConfig {
    pub fn poll_interval(&self) -> Duration {
        secs(self.poll_interval_secs)
    }
}

/// Everything `RiotClient` needs besides the API key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub domain: String,
    /// Host prefix for summoner lookups.
    pub platform: String,
    /// Host prefix for match lookups.
    pub region: String,
    /// Sends every request to `{base_url}/{route}` instead of the regional host.
    pub base_url: Option<String>,
    pub batch_size: usize,
    pub batch_pause_secs: f64,
    pub gate: GateConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
            region: DEFAULT_REGION.to_string(),
            base_url: None,
            batch_size: 10,
            batch_pause_secs: 30.0,
            gate: GateConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let parsed = toml::from_str::<ClientConfig>(&raw).context("parse config")?;
        parsed
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(parsed)
    }

    /// Every window needs capacity >= 1 and a positive interval; the poll
    /// interval must be positive.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, window) in [("gate.short", &self.gate.short), ("gate.long", &self.gate.long)] {
            if window.capacity == 0 {
                anyhow::bail!("{name}.capacity must be at least 1");
            }
            if !positive(window.interval_secs) {
                anyhow::bail!(
                    "{name}.interval_secs must be greater than 0, got {}",
                    window.interval_secs
                );
            }
        }
        if !positive(self.gate.poll_interval_secs) {
            anyhow::bail!(
                "gate.poll_interval_secs must be greater than 0, got {}",
                self.gate.poll_interval_secs
            );
        }
        if !(self.batch_pause_secs.is_finite() && self.batch_pause_secs >= 0.0) {
            anyhow::bail!(
                "batch_pause_secs must not be negative, got {}",
                self.batch_pause_secs
            );
        }
        Ok(())
    }

    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn batch_pause(&self) -> Duration {
        secs(self.batch_pause_secs)
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn secs(value: f64) -> Duration {
    if positive(value) {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}
