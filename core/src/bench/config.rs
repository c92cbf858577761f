//! Benchmark configuration.
//!
//! Layers, later wins: defaults, a config file, `key=value` overrides.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Deserializer, Serialize};

use super::breadth::target_count;
use super::report::OutputFormat;
use crate::rt::{RuntimeFlavor, SchedulerKind};

pub const DEFAULT_MILLIONS: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Each value is one configuration; `N = millions × 1e6`.
    #[serde(deserialize_with = "one_or_many")]
    pub millions: Vec<f64>,
    pub backend: SchedulerKind,
    pub runtime: RuntimeFlavor,
    /// Repetitions per configuration.
    pub runs: u32,
    /// Drain timeout for the channel backend; 0 waits forever.
    pub timeout_ms: u64,
    pub format: OutputFormat,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            millions: vec![DEFAULT_MILLIONS],
            backend: SchedulerKind::default(),
            runtime: RuntimeFlavor::default(),
            runs: 1,
            timeout_ms: 0,
            format: OutputFormat::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(f64),
    Many(Vec<f64>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

impl BenchConfig {
    /// Read a config file; the format follows the extension (`toml`, `json`,
    /// `yaml`/`yml`).
    pub fn load(path: &Path) -> Result<Self> {
        let src = fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let config = match ext.as_str() {
            "toml" => toml::from_str(&src).with_context(|| format!("parse TOML config {}", path.display()))?,
            "json" => serde_json::from_str(&src).with_context(|| format!("parse JSON config {}", path.display()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&src).with_context(|| format!("parse YAML config {}", path.display()))?
            }
            other => bail!(
                "unsupported config extension '{}' for {} (expected toml, json, yaml or yml)",
                other,
                path.display()
            ),
        };
        Ok(config)
    }

    /// Apply one `key=value` override. `millions` takes a comma-separated
    /// list.
    pub fn apply_override(&mut self, raw: &str) -> Result<()> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, got '{}'", raw))?;
        let value = value.trim();
        match key.trim() {
            "millions" => {
                self.millions = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        s.parse::<f64>()
                            .with_context(|| format!("parse millions value '{}' as a number", s))
                    })
                    .collect::<Result<_>>()?;
            }
            "backend" => self.backend = value.parse()?,
            "runtime" => self.runtime = value.parse()?,
            "runs" => {
                self.runs = value
                    .parse()
                    .with_context(|| format!("parse runs value '{}' as a positive integer", value))?
            }
            "timeout_ms" | "timeout-ms" => {
                self.timeout_ms = value
                    .parse()
                    .with_context(|| format!("parse timeout_ms value '{}' as milliseconds", value))?
            }
            "format" => self.format = value.parse()?,
            other => bail!(
                "unknown option '{}' (known: millions, backend, runtime, runs, timeout_ms, format)",
                other
            ),
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.millions.is_empty() {
            bail!("at least one millions value is required");
        }
        for &millions in &self.millions {
            target_count(millions)?;
        }
        if self.runs == 0 {
            bail!("runs must be at least 1");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}
