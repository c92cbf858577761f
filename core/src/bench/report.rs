//! Measurement records and their text / CSV / JSON renderings.

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::breadth::{ArityCounts, BENCH_NAME, BreadthOutcome};
use crate::rt::{RuntimeFlavor, SchedulerKind};

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(anyhow!("unknown output format '{}' (expected text, json or csv)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        };
        f.write_str(label)
    }
}

/// One benchmark run, as reported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub name: String,
    pub backend: SchedulerKind,
    pub millions: f64,
    pub n: u64,
    pub elapsed_ns: u64,
    /// Millions of completed callbacks per second.
    pub rate: f64,
    pub scheduled: ArityCounts,
    pub invoked: ArityCounts,
}

impl Measurement {
    pub fn from_outcome(outcome: &BreadthOutcome) -> Self {
        Measurement {
            name: BENCH_NAME.to_string(),
            backend: outcome.backend,
            millions: outcome.millions,
            n: outcome.n,
            elapsed_ns: u64::try_from(outcome.sample.elapsed.as_nanos()).unwrap_or(u64::MAX),
            rate: outcome.sample.rate,
            scheduled: outcome.scheduled,
            invoked: outcome.invoked,
        }
    }

    /// `key=value` pairs identifying the configuration, e.g. `millions=2`.
    pub fn configuration(&self) -> String {
        format!("millions={}", self.millions)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ns as f64 / 1e9
    }

    /// `name key=value: rate`
    pub fn text_line(&self) -> String {
        format!("{} {}: {}", self.name, self.configuration(), format_rate(self.rate))
    }

    pub fn csv_row(&self) -> String {
        format!(
            "\"{}\",\"{}\",{},{}",
            self.name,
            self.configuration(),
            self.rate,
            self.elapsed_secs()
        )
    }
}

pub const CSV_HEADER: &str = "filename,configuration,rate,time";

/// Everything one invocation produced
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub generated_at: String,
    pub backend: SchedulerKind,
    /// Absent when the backend runs without a tokio runtime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeFlavor>,
    pub results: Vec<Measurement>,
}

impl RunRecord {
    pub fn new(
        generated_at: DateTime<Utc>,
        backend: SchedulerKind,
        runtime: Option<RuntimeFlavor>,
        results: Vec<Measurement>,
    ) -> Self {
        RunRecord {
            generated_at: generated_at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            backend,
            runtime,
            results,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        let mut out = String::new();
        match format {
            OutputFormat::Text => {
                for m in &self.results {
                    out.push_str(&m.text_line());
                    out.push('\n');
                }
            }
            OutputFormat::Csv => {
                out.push_str(CSV_HEADER);
                out.push('\n');
                for m in &self.results {
                    out.push_str(&m.csv_row());
                    out.push('\n');
                }
            }
            OutputFormat::Json => {
                out = serde_json::to_string_pretty(self).context("serialize run record")?;
                out.push('\n');
            }
        }
        Ok(out)
    }
}

/// Rate with thousands separators in the integer part: `12345.678` becomes
/// `12,345.678`.
pub fn format_rate(rate: f64) -> String {
    let raw = rate.to_string();
    if !rate.is_finite() {
        return raw;
    }
    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(raw.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value).with_context(|| format!("write {}", path.display()))
}
