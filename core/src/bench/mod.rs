//! Benchmark driver, harness, configuration and reporting.

pub mod breadth;
pub mod config;
pub mod harness;
pub mod report;
pub mod runner;

pub use breadth::{ArityCounts, BENCH_NAME, BreadthOutcome, BreadthState};
pub use config::BenchConfig;
pub use harness::{Harness, Sample};
pub use report::{Measurement, OutputFormat, RunRecord};

#[cfg(test)]
mod runner_test;
