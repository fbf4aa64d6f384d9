//! Integration tests for triage-config

use std::io::Write;
use std::time::Duration;
use temp_env::{with_vars, with_vars_unset};
use triage_config::domains::logging::{LogFormat, LogLevel};
use triage_config::*;
use triage_core::Stage;

/// Every variable the default loader reads; file tests run with these unset
/// so they cannot see values set by the env tests running alongside them
const TRIAGE_VARS: [&str; 10] = [
    "TRIAGE_HOST",
    "TRIAGE_HTTP_TIMEOUT",
    "TRIAGE_TICK_INTERVAL",
    "TRIAGE_MAX_RUN_TIME",
    "TRIAGE_SEED",
    "TRIAGE_MIN_WAIT",
    "TRIAGE_MAX_WAIT",
    "TRIAGE_SLOW_REQUEST_THRESHOLD",
    "TRIAGE_LOG_LEVEL",
    "TRIAGE_LOG_FORMAT",
];

#[test]
fn test_default_config_validation() {
    let config = TriageConfig::default();
    assert!(config.validate_all().is_ok());
}

#[test]
fn test_config_loader_from_env() {
    let vars = vec![
        ("TRIAGE_HOST", Some("http://10.0.0.5:8888")),
        ("TRIAGE_HTTP_TIMEOUT", Some("5")),
        ("TRIAGE_MIN_WAIT", Some("500ms")),
        ("TRIAGE_MAX_WAIT", Some("2s")),
        ("TRIAGE_SEED", Some("1234")),
        ("TRIAGE_LOG_LEVEL", Some("debug")),
        ("TRIAGE_SLOW_REQUEST_THRESHOLD", Some("250ms")),
    ];

    with_vars(vars, || {
        let loader = ConfigLoader::new();
        let config = loader.from_env().unwrap();

        assert_eq!(config.target.host, "http://10.0.0.5:8888");
        assert_eq!(config.http.timeout, Duration::from_secs(5));
        assert_eq!(config.user.min_wait, Duration::from_millis(500));
        assert_eq!(config.user.max_wait, Duration::from_secs(2));
        assert_eq!(config.load.seed, Some(1234));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(
            config.reporting.slow_request_threshold,
            Duration::from_millis(250)
        );
    });
}

#[test]
fn test_invalid_env_values() {
    with_vars(vec![("TRIAGE_SEED", Some("abc"))], || {
        assert!(matches!(
            ConfigLoader::new().from_env(),
            Err(ConfigError::EnvError(_))
        ));
    });

    with_vars(vec![("TRIAGE_MAX_WAIT", Some("eventually"))], || {
        assert!(ConfigLoader::new().from_env().is_err());
    });

    // Env overrides are validated like file values
    with_vars(
        vec![
            ("TRIAGE_MIN_WAIT", Some("10s")),
            ("TRIAGE_MAX_WAIT", Some("1s")),
        ],
        || {
            assert!(matches!(
                ConfigLoader::new().from_env(),
                Err(ConfigError::DomainError { .. })
            ));
        },
    );
}

#[test]
fn test_yaml_config_serialization() {
    let yaml = TriageConfig::generate_sample();
    let parsed: TriageConfig = serde_yaml::from_str(&yaml).unwrap();
    assert!(parsed.validate_all().is_ok());
    assert_eq!(parsed.load.stages.len(), 8);
    assert_eq!(parsed.user.max_wait, Duration::from_secs(3));
}

#[test]
fn test_comprehensive_config() {
    let yaml = r#"
target:
  host: "http://hospital.internal:8888"
  name: "Staging hospital"

http:
  timeout: 10
  user_agent: "Test Agent"
  verify_ssl: false

load:
  tick_interval: 500ms
  seed: 99
  max_run_time: 2m
  stages:
    - { duration_seconds: 60, target_users: 20, spawn_rate: 1 }
    - { duration: 120, users: 40, spawn_rate: 2.5 }

user:
  min_wait: 100ms
  max_wait: 1s
  task_weights:
    create_patient: 0
    view_main_page: 1

reporting:
  slow_request_threshold: 750ms
  failure_samples: 3
  report_path: "/tmp/triage-report.json"

logging:
  level: warn
  format: json
"#;

    let config = with_vars_unset(TRIAGE_VARS, || ConfigLoader::new().from_yaml(yaml).unwrap());

    assert_eq!(config.target.name, "Staging hospital");
    assert_eq!(config.http.timeout, Duration::from_secs(10));
    assert!(!config.http.verify_ssl);
    assert_eq!(config.load.tick_interval, Duration::from_millis(500));
    assert_eq!(config.load.seed, Some(99));
    assert_eq!(config.load.max_run_time, Some(Duration::from_secs(120)));
    assert_eq!(
        config.load.stages,
        vec![Stage::new(60, 20, 1.0), Stage::new(120, 40, 2.5)]
    );
    assert_eq!(config.user.task_weights.get("create_patient"), Some(&0));
    assert_eq!(config.reporting.failure_samples, 3);
    assert_eq!(config.logging.level, LogLevel::Warn);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_unsorted_profile_is_fatal() {
    let yaml = r#"
load:
  stages:
    - { duration_seconds: 120, target_users: 40, spawn_rate: 1 }
    - { duration_seconds: 60, target_users: 20, spawn_rate: 1 }
"#;
    let err = with_vars_unset(TRIAGE_VARS, || ConfigLoader::new().from_yaml(yaml).unwrap_err());
    match err {
        ConfigError::DomainError { domain, message } => {
            assert_eq!(domain, "load");
            assert!(message.contains("stage 1"), "{}", message);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "target:\n  host: \"http://127.0.0.1:9000\"").unwrap();

    with_vars_unset(TRIAGE_VARS, || {
        let config = ConfigLoader::new().load(Some(file.path())).unwrap();
        assert_eq!(config.target.host, "http://127.0.0.1:9000");
        assert_eq!(config.http.timeout, Duration::from_secs(30));
    });

    assert!(matches!(
        ConfigLoader::new().from_file("/definitely/not/here.yaml"),
        Err(ConfigError::FileReadError(_))
    ));
}

#[test]
fn test_zero_weight_override_keeps_other_tasks() {
    let yaml = "user:\n  task_weights:\n    view_main_page: 0\n";
    let config = with_vars_unset(TRIAGE_VARS, || ConfigLoader::new().from_yaml(yaml).unwrap());
    assert_eq!(config.user.task_weights.get("view_main_page"), Some(&0));
}

#[test]
fn test_custom_prefix_loader() {
    with_vars(vec![("CUSTOM_HTTP_TIMEOUT", Some("120"))], || {
        let loader = ConfigLoader::with_prefix("CUSTOM");
        let config = loader.from_env().unwrap();
        assert_eq!(config.http.timeout, Duration::from_secs(120));
    });
}
