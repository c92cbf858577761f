#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::bench::{ArityCounts, BenchConfig, runner};
    use crate::rt::{RuntimeFlavor, SchedulerKind};

    #[test]
    fn runs_every_configuration_and_repetition() -> Result<()> {
        let mut config = BenchConfig::default();
        config.apply_override("millions=0.01,0.002")?;
        config.apply_override("runs=2")?;

        let mut streamed = Vec::new();
        let record = runner::run_with(&config, |m| {
            streamed.push(m.configuration());
            Ok(())
        })?;

        assert_eq!(
            streamed,
            vec!["millions=0.01", "millions=0.01", "millions=0.002", "millions=0.002"]
        );
        assert_eq!(record.results.len(), 4);
        assert_eq!(record.results[0].invoked, ArityCounts::expected(10_000));
        assert_eq!(record.results[3].invoked.total(), 2_000);
        assert_eq!(record.backend, SchedulerKind::Queue);
        assert_eq!(record.runtime, None);
        Ok(())
    }

    #[test]
    fn channel_backend_runs_under_timeout() -> Result<()> {
        let mut config = BenchConfig::default();
        config.apply_override("millions=0.005")?;
        config.apply_override("backend=channel")?;
        config.apply_override("timeout_ms=60000")?;

        let record = runner::run(&config)?;
        assert_eq!(record.backend, SchedulerKind::Channel);
        assert_eq!(record.runtime, Some(RuntimeFlavor::CurrentThread));
        assert_eq!(record.results[0].n, 5_000);
        assert_eq!(record.results[0].invoked, record.results[0].scheduled);
        Ok(())
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let mut config = BenchConfig::default();
        config.millions = vec![0.0000015];
        let err = runner::run(&config).unwrap_err();
        assert!(err.to_string().contains("whole number of ticks"));
    }

    #[test]
    fn callback_errors_abort_the_run() {
        let mut config = BenchConfig::default();
        config.millions = vec![0.001];
        let err = runner::run_with(&config, |_| Err(anyhow::anyhow!("sink closed"))).unwrap_err();
        assert_eq!(err.to_string(), "sink closed");
    }

    #[test]
    fn huge_run_count_streams_without_reserving_up_front() {
        let mut config = BenchConfig::default();
        config.millions = vec![0.0];
        config.runs = u32::MAX;

        let mut seen = 0u32;
        let err = runner::run_with(&config, |_| {
            seen += 1;
            if seen == 3 {
                anyhow::bail!("enough runs");
            }
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "enough runs");
        assert_eq!(seen, 3);
    }
}
