//! Runs every configured benchmark and collects the measurements.

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use super::breadth;
use super::config::BenchConfig;
use super::report::{Measurement, RunRecord};
use crate::rt::{ChannelTickQueue, Runtime, SchedulerKind, TickQueue};

/// Run the whole option grid, calling `on_measurement` as each run finishes.
///
/// Every run gets a fresh scheduler and fresh state.
pub fn run_with<F>(config: &BenchConfig, mut on_measurement: F) -> Result<RunRecord>
where
    F: FnMut(&Measurement) -> Result<()>,
{
    config.validate()?;
    let runtime = match config.backend {
        SchedulerKind::Channel => Some(Runtime::with_flavor(config.runtime)?),
        SchedulerKind::Queue => None,
    };

    let mut results = Vec::new();
    for &millions in &config.millions {
        for run_idx in 0..config.runs {
            debug!(backend = %config.backend, millions, run = run_idx + 1, "starting run");
            let outcome = match &runtime {
                Some(runtime) => {
                    let mut queue = ChannelTickQueue::new();
                    breadth::run_bounded(&mut queue, runtime, millions, config.timeout())
                }
                None => {
                    let mut queue = TickQueue::new();
                    breadth::run(&mut queue, millions)
                }
            }
            .with_context(|| format!("{} millions={} (run {})", breadth::BENCH_NAME, millions, run_idx + 1))?;

            let measurement = Measurement::from_outcome(&outcome);
            info!(
                name = %measurement.name,
                configuration = %measurement.configuration(),
                rate = measurement.rate,
                elapsed_ns = measurement.elapsed_ns,
                "benchmark finished"
            );
            on_measurement(&measurement)?;
            results.push(measurement);
        }
    }

    Ok(RunRecord::new(
        Utc::now(),
        config.backend,
        runtime.as_ref().map(Runtime::flavor),
        results,
    ))
}

pub fn run(config: &BenchConfig) -> Result<RunRecord> {
    run_with(config, |_| Ok(()))
}
