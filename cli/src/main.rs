use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::sync::Once;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tickbench_core::{
    bench::{BENCH_NAME, BenchConfig, Measurement, OutputFormat, report, runner},
    rt::{RuntimeFlavor, SchedulerKind},
};
use tracing::debug;

#[cfg(test)]
mod main_test;

static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "tickbench_core=debug,tickbench=info";

#[derive(Debug, Parser)]
#[command(
    name = "tickbench",
    author,
    version,
    about = "Deferred-callback throughput benchmark",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct CliArgs {
    /// Subcommands; without one, the benchmark runs
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the benchmark (the default).
    Run(RunArgs),
    /// List benchmarks, backends and options.
    List,
}

#[derive(Debug, Clone, Default, Args)]
struct RunArgs {
    /// Config file (.toml, .json, .yaml or .yml)
    #[arg(long, value_name = "FILE", value_parser = parse_sanitized_path)]
    config: Option<PathBuf>,

    /// Option override, e.g. `--set millions=1,2`; may repeat
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Scheduler backend: queue or channel
    #[arg(long, value_name = "BACKEND", value_parser = parse_backend)]
    backend: Option<SchedulerKind>,

    /// tokio runtime for the channel backend: current_thread or multi_thread
    #[arg(long, value_name = "FLAVOR", value_parser = parse_runtime)]
    runtime: Option<RuntimeFlavor>,

    /// Repetitions per configuration
    #[arg(long, value_name = "N")]
    runs: Option<u32>,

    /// Drain timeout in milliseconds for the channel backend (0 = none)
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Output format: text, csv or json
    #[arg(long, value_name = "FORMAT", value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Also write the JSON run record to this file
    #[arg(long, value_name = "FILE", value_parser = parse_sanitized_path)]
    output: Option<PathBuf>,
}

fn sanitize_path(raw: &str) -> anyhow::Result<PathBuf> {
    let p = Path::new(raw);

    for comp in p.components() {
        if matches!(comp, Component::ParentDir) {
            return Err(anyhow::anyhow!(
                "Parent directory components ('..') are not allowed in file paths."
            ));
        }
    }

    Ok(p.to_path_buf())
}

fn parse_sanitized_path(raw: &str) -> Result<PathBuf, String> {
    sanitize_path(raw).map_err(|e| e.to_string())
}

fn parse_backend(raw: &str) -> Result<SchedulerKind, String> {
    raw.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_runtime(raw: &str) -> Result<RuntimeFlavor, String> {
    raw.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_format(raw: &str) -> Result<OutputFormat, String> {
    raw.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn env_toggle_enabled(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    !(trimmed.eq_ignore_ascii_case("0") || trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("off"))
}

fn filter_expr_from(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("1")
        || trimmed.eq_ignore_ascii_case("true")
        || trimmed.eq_ignore_ascii_case("on")
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn maybe_init_tracing() {
    let raw = match std::env::var("TICKBENCH_TRACE") {
        Ok(value) => value,
        Err(_) => return,
    };

    if !env_toggle_enabled(&raw) {
        return;
    }

    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let filter_expr = filter_expr_from(&raw).or_else(|| std::env::var("RUST_LOG").ok());

        let builder = fmt().with_writer(std::io::stderr);

        let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };

        let _ = builder.try_init();
    });
}

/// Defaults, then the config file, then `--set`, then dedicated flags.
fn build_config(args: &RunArgs) -> anyhow::Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::default(),
    };
    for raw in &args.set {
        config
            .apply_override(raw)
            .with_context(|| format!("invalid --set {}", raw))?;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(runtime) = args.runtime {
        config.runtime = runtime;
    }
    if let Some(runs) = args.runs {
        config.runs = runs;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    config.validate()?;
    Ok(config)
}

fn run_benchmarks(args: &RunArgs) -> anyhow::Result<()> {
    let config = build_config(args)?;
    debug!(?config, "resolved configuration");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if config.format == OutputFormat::Csv {
        writeln!(out, "{}", report::CSV_HEADER)?;
    }

    // Text and CSV stream one line per finished run; JSON prints the record at the end.
    let record = runner::run_with(&config, |m: &Measurement| {
        match config.format {
            OutputFormat::Text => writeln!(out, "{}", m.text_line())?,
            OutputFormat::Csv => writeln!(out, "{}", m.csv_row())?,
            OutputFormat::Json => {}
        }
        out.flush()?;
        Ok(())
    })?;

    if config.format == OutputFormat::Json {
        write!(out, "{}", record.render(OutputFormat::Json)?)?;
    }
    if let Some(path) = &args.output {
        report::write_json(path, &record)?;
    }
    Ok(())
}

fn list() {
    println!("Benchmarks:");
    println!("  {}  (options: millions, default 2)", BENCH_NAME);
    println!();
    println!("Backends:");
    for kind in SchedulerKind::ALL {
        println!("  {:<8} {}", kind.label(), kind.description());
    }
    println!();
    println!("Options (--set KEY=VALUE or config file):");
    println!("  millions    comma-separated list; N = millions x 1e6");
    println!("  backend     queue | channel");
    println!("  runtime     current_thread | multi_thread");
    println!("  runs        repetitions per configuration");
    println!("  timeout_ms  channel drain timeout, 0 = none");
    println!("  format      text | csv | json");
}

fn main() -> anyhow::Result<()> {
    maybe_init_tracing();

    let CliArgs { command, run } = CliArgs::parse();

    match command {
        Some(Commands::List) => {
            list();
            Ok(())
        }
        Some(Commands::Run(args)) => run_benchmarks(&args),
        None => run_benchmarks(&run),
    }
}
