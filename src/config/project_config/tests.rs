use super::*;
use std::path::PathBuf;

#[test]
fn test_normalize_metric_name() {
    assert_eq!(normalize_metric_name("Function-Length"), "function_length");
    assert_eq!(normalize_metric_name(" error handling "), "error_handling");
    assert_eq!(normalize_metric_name("naming"), "naming");
}

#[test]
fn test_glob_match() {
    // ** patterns
    assert!(glob_match("**/vendor/**", "src/vendor/lib/foo.py"));
    assert!(glob_match("**/vendor/**", "vendor/foo.go"));
    assert!(glob_match("generated/", "generated/model.py"));
    assert!(glob_match("*.test.ts", "foo.test.ts"));
    assert!(glob_match("*.test.ts", "src/ui/foo.test.ts"));
    assert!(glob_match("src/**/gen.rs", "src/a/b/gen.rs"));
    assert!(glob_match("**/*.min.js", "web/static/app.min.js"));
    assert!(glob_match("**/*.min.js", "app.min.js"));
    assert!(!glob_match("**/*.min.js", "web/static/app.js"));
    assert!(glob_match("src/**/*_pb.go", "src/api/v1/user_pb.go"));
    assert!(!glob_match("src/**/*_pb.go", "cmd/user_pb.go"));

    // Prefix patterns
    assert!(glob_match("vendor/", "vendor/lib/foo.py"));
    assert!(!glob_match("vendor/", "src/vendor/foo.py"));
}

#[test]
fn test_defaults() {
    let config = ProjectConfig::default();
    assert_eq!(config.workers, DEFAULT_WORKERS);
    assert_eq!(config.duplication.min_tokens, 4);
    assert_eq!(config.duplication.min_functions, 3);
    assert!(config.validate().is_ok());
    for kind in MetricKind::ALL {
        assert!(config.is_metric_enabled(kind));
    }
}

#[test]
fn test_parse_full_config() {
    let toml = r#"
workers = 4

[duplication]
min_tokens = 6

[metrics]
disabled = ["Naming", "comment-ratio"]

[exclude]
paths = ["vendor/"]
"#;
    let config: ProjectConfig = toml::from_str(toml).expect("valid toml");
    assert!(config.validate().is_ok());
    assert_eq!(config.workers, 4);
    assert_eq!(config.duplication.min_tokens, 6);
    assert_eq!(config.duplication.min_functions, 3);
    assert!(!config.is_metric_enabled(MetricKind::Naming));
    assert!(!config.is_metric_enabled(MetricKind::CommentRatio));
    assert!(config.is_metric_enabled(MetricKind::Cyclomatic));
    assert!(config.should_exclude(&PathBuf::from("vendor/x.go")));
    assert!(!config.should_exclude(&PathBuf::from("src/x.go")));
}

#[test]
fn test_validate_rejects_bad_values() {
    let config = ProjectConfig {
        workers: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "workers", .. })
    ));

    let config = ProjectConfig {
        workers: MAX_WORKERS + 1,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let mut config = ProjectConfig::default();
    config.metrics.disabled.push("vibes".to_string());
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "metrics.disabled", .. })
    ));
}

#[test]
fn test_unknown_keys_rejected() {
    let result: Result<ProjectConfig, _> = toml::from_str("wokers = 3\n");
    assert!(result.is_err());
}

#[test]
fn test_load_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = load_project_config(dir.path()).expect("defaults");
    assert_eq!(config, ProjectConfig::default());
}

#[test]
fn test_load_invalid_file_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "workers = [").expect("write");
    let err = load_project_config(dir.path()).expect_err("parse error");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}
