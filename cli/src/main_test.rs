mod tests {
    use crate::*;

    #[test]
    fn test_sanitize_path_allows_simple_relative() {
        let p = sanitize_path("configs/bench.toml").expect("relative path should be allowed");
        assert_eq!(p, PathBuf::from("configs/bench.toml"));
    }

    #[test]
    fn test_sanitize_path_rejects_parent_dir() {
        let err = sanitize_path("configs/../bench.toml").unwrap_err();
        assert!(err.to_string().contains("Parent directory components"));
    }

    #[test]
    fn test_cli_args_default_to_run() {
        let args = CliArgs::try_parse_from(["tickbench", "--set", "millions=1"]).expect("should parse");
        assert!(args.command.is_none());
        assert_eq!(args.run.set, vec!["millions=1".to_string()]);
    }

    #[test]
    fn test_cli_args_run_subcommand_flags() {
        let args = CliArgs::try_parse_from([
            "tickbench",
            "run",
            "--backend",
            "channel",
            "--runtime",
            "multi_thread",
            "--runs",
            "3",
            "--timeout-ms",
            "500",
            "--format",
            "json",
        ])
        .expect("should parse");
        match args.command {
            Some(Commands::Run(run)) => {
                assert_eq!(run.backend, Some(SchedulerKind::Channel));
                assert_eq!(run.runtime, Some(RuntimeFlavor::MultiThread));
                assert_eq!(run.runs, Some(3));
                assert_eq!(run.timeout_ms, Some(500));
                assert_eq!(run.format, Some(OutputFormat::Json));
            }
            other => panic!("expected run command, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_args_reject_unknown_backend() {
        let err = CliArgs::try_parse_from(["tickbench", "--backend", "heap"]).unwrap_err();
        assert!(err.to_string().contains("unknown scheduler backend"));
    }

    #[test]
    fn test_cli_args_reject_parent_dir_config() {
        assert!(CliArgs::try_parse_from(["tickbench", "--config", "../bench.toml"]).is_err());
    }

    #[test]
    fn test_flags_override_set_values() {
        let args = RunArgs {
            set: vec!["millions=0.5".to_string(), "runs=4".to_string(), "format=csv".to_string()],
            runs: Some(2),
            ..RunArgs::default()
        };
        let config = build_config(&args).expect("valid config");
        assert_eq!(config.millions, vec![0.5]);
        assert_eq!(config.runs, 2);
        assert_eq!(config.format, OutputFormat::Csv);
    }

    #[test]
    fn test_build_config_reports_bad_set() {
        let args = RunArgs {
            set: vec!["colour=blue".to_string()],
            ..RunArgs::default()
        };
        let err = build_config(&args).unwrap_err();
        assert_eq!(err.to_string(), "invalid --set colour=blue");
        assert!(format!("{:#}", err).contains("unknown option 'colour'"));
    }

    #[test]
    fn test_trace_toggle_parsing() {
        assert!(env_toggle_enabled("1"));
        assert!(env_toggle_enabled("tickbench_core=trace"));
        assert!(!env_toggle_enabled("off"));
        assert!(!env_toggle_enabled("  "));
        assert_eq!(filter_expr_from("true"), None);
        assert_eq!(filter_expr_from("tickbench_core=trace"), Some("tickbench_core=trace".to_string()));
    }
}
