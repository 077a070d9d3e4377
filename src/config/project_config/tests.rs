use super::*;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn test_defaults() {
    let config = TrinityFullConfig::default();
    assert_eq!(config.validation.min_trinity_score, 90);
    assert_eq!(config.validation.test_timeout_secs, 300);
    assert_eq!(config.directories.source_root, "src");
    assert_eq!(config.directories.test_root, "__tests__");
    assert_eq!(config.synchronization.test_suffix, ".test");
    assert!(config.validate().valid);
}

#[test]
fn test_parse_partial_toml() {
    let toml_str = r#"
[project]
name = "storefront"

[validation]
min_trinity_score = 85

[scoring.weights]
test = 2.0
"#;
    let config: TrinityFullConfig = toml::from_str(toml_str).expect("parse partial config");
    assert_eq!(config.project.name.as_deref(), Some("storefront"));
    assert_eq!(config.validation.min_trinity_score, 85);
    assert!((config.scoring.weights.test - 2.0).abs() < 0.001);
    assert!((config.scoring.weights.documentation - 1.0).abs() < 0.001);
    // untouched sections keep defaults
    assert_eq!(config.directories.test_root, "__tests__");
}

#[test]
fn test_deep_merge_objects_and_arrays() {
    let mut base = json!({
        "a": { "x": 1, "y": [1, 2, 3] },
        "b": "keep"
    });
    deep_merge(&mut base, json!({ "a": { "y": [9] }, "c": true }));
    assert_eq!(
        base,
        json!({
            "a": { "x": 1, "y": [9] },
            "b": "keep",
            "c": true
        })
    );
}

#[test]
fn test_update_config_merges_key_by_key() {
    let mut manager = ConfigManager::from_config("/tmp", TrinityFullConfig::default());
    manager
        .update_config(json!({ "validation": { "min_trinity_score": 70 } }))
        .expect("merge");
    let config = manager.get_config();
    assert_eq!(config.validation.min_trinity_score, 70);
    assert_eq!(config.validation.test_timeout_secs, 300);
    assert!(config.validation.check_unused_imports);
}

#[test]
fn test_update_config_rejects_wrong_types() {
    let mut manager = ConfigManager::from_config("/tmp", TrinityFullConfig::default());
    let result = manager.update_config(json!({ "validation": { "min_trinity_score": "high" } }));
    assert!(result.is_err());
    // failed merge leaves the config untouched
    assert_eq!(manager.get_config().validation.min_trinity_score, 90);
}

#[test]
fn test_validate_rejects_out_of_range_values() {
    let mut config = TrinityFullConfig::default();
    config.validation.min_trinity_score = 150;
    config.scoring.weights.test = -1.0;
    config.patterns.test.push("src/[".to_string());

    let validation = config.validate();
    assert!(!validation.valid);
    assert_eq!(validation.errors.len(), 3, "{:?}", validation.errors);
    assert!(validation.errors[0].contains("min_trinity_score"));
}

#[test]
fn test_validate_rejects_all_zero_weights() {
    let mut config = TrinityFullConfig::default();
    config.scoring.weights = LayerWeights {
        test: 0.0,
        implementation: 0.0,
        documentation: 0.0,
    };
    let validation = config.validate();
    assert!(!validation.valid);
    assert!(validation.errors.iter().any(|e| e.contains("all be zero")));
}

#[test]
fn test_load_prefers_toml_over_json() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[validation]\nmin_trinity_score = 80\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join(RC_FILE_NAME),
        r#"{ "validation": { "min_trinity_score": 60 } }"#,
    )
    .unwrap();

    let manager = ConfigManager::load(dir.path());
    assert_eq!(manager.get_config().validation.min_trinity_score, 80);
    assert_eq!(manager.source(), Some(dir.path().join(CONFIG_FILE_NAME).as_path()));
    assert!(manager.load_error().is_none());
}

#[test]
fn test_load_json_rc() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(RC_FILE_NAME),
        r#"{ "directories": { "test_root": "test" } }"#,
    )
    .unwrap();

    let manager = ConfigManager::load(dir.path());
    assert_eq!(manager.get_config().directories.test_root, "test");
    assert_eq!(manager.get_config().directories.source_root, "src");
}

#[test]
fn test_load_malformed_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[validation\nbroken = ").unwrap();

    let manager = ConfigManager::load(dir.path());
    assert_eq!(manager.get_config(), &TrinityFullConfig::default());
    assert!(manager.load_error().is_some());
    assert!(manager.source().is_none());
}

#[test]
fn test_load_with_overrides_wins_over_file() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[validation]\nmin_trinity_score = 80\ntest_timeout_secs = 30\n",
    )
    .unwrap();

    let manager = ConfigManager::load_with_overrides(
        dir.path(),
        Some(json!({ "validation": { "min_trinity_score": 95 } })),
    );
    let config = manager.get_config();
    assert_eq!(config.validation.min_trinity_score, 95);
    assert_eq!(config.validation.test_timeout_secs, 30);
}

#[test]
fn test_apply_unknown_template_errors() {
    let mut manager = ConfigManager::from_config("/tmp", TrinityFullConfig::default());
    let err = manager.apply_template("cobol").unwrap_err();
    assert!(matches!(err, TrinityError::UnknownTemplate(ref name) if name == "cobol"));
}

#[test]
fn test_save_round_trips_through_load() {
    let dir = tempdir().unwrap();
    let mut manager = ConfigManager::from_config(dir.path(), TrinityFullConfig::default());
    manager.apply_template("python").expect("python template");
    manager
        .update_config(json!({ "project": { "name": "pkg" } }))
        .unwrap();
    let path = manager.save().expect("save");
    assert!(path.ends_with(CONFIG_FILE_NAME));

    let reloaded = ConfigManager::load(dir.path());
    assert!(reloaded.load_error().is_none(), "{:?}", reloaded.load_error());
    assert_eq!(reloaded.get_config(), manager.get_config());
}

#[test]
fn test_auto_detect_javascript_project() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("package.json"),
        r#"{ "name": "shop", "scripts": { "test": "jest" }, "devDependencies": { "jest": "^29.0.0" } }"#,
    )
    .unwrap();

    let mut manager = ConfigManager::from_config(dir.path(), TrinityFullConfig::default());
    let language = manager.auto_detect_project();
    assert_eq!(language, Some("javascript"));
    let config = manager.get_config();
    assert_eq!(config.project.name.as_deref(), Some("shop"));
    assert_eq!(config.project.framework.as_deref(), Some("jest"));
    assert_eq!(config.validation.test_command.as_deref(), Some("npm test"));
}

#[test]
fn test_auto_detect_keeps_explicit_settings() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("package.json"), r#"{ "name": "shop" }"#).unwrap();

    let mut config = TrinityFullConfig::default();
    config.project.name = Some("custom".to_string());
    let mut manager = ConfigManager::from_config(dir.path(), config);
    manager.auto_detect_project();
    assert_eq!(manager.get_config().project.name.as_deref(), Some("custom"));
}

#[test]
fn test_load_malformed_toml_does_not_fall_through_to_json() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[validation\nbroken = ").unwrap();
    std::fs::write(
        dir.path().join(RC_FILE_NAME),
        r#"{ "validation": { "min_trinity_score": 60 } }"#,
    )
    .unwrap();

    let manager = ConfigManager::load(dir.path());
    assert!(manager.load_error().is_some());
    assert!(manager.source().is_none());
    assert_eq!(manager.get_config().validation.min_trinity_score, 90);
}

#[test]
fn test_auto_detect_keeps_project_file_and_overrides() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("pyproject.toml"), "[project]\nname = \"pkg\"\n").unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
[directories]
source = ["pkg"]
test_root = "spec"

[synchronization]
exempt_patterns = ["**/gen/**"]
"#,
    )
    .unwrap();

    let mut manager = ConfigManager::load_with_overrides(
        dir.path(),
        Some(json!({ "directories": { "dependency_store": "my_store" } })),
    );
    assert_eq!(manager.auto_detect_project(), Some("python"));

    let config = manager.get_config();
    assert_eq!(config.directories.source, vec!["pkg"]);
    assert_eq!(config.directories.test_root, "spec");
    assert_eq!(config.synchronization.exempt_patterns, vec!["**/gen/**"]);
    assert_eq!(config.directories.dependency_store, "my_store");
    // keys nobody set come from the python presets
    assert_eq!(config.patterns.implementation, vec!["**/*.py"]);
    assert_eq!(config.synchronization.test_prefix, "test_");
    assert_eq!(config.project.name.as_deref(), Some("pkg"));
}

#[test]
fn test_auto_detect_keeps_later_updates() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"krate\"\n").unwrap();

    let mut manager = ConfigManager::from_config(dir.path(), TrinityFullConfig::default());
    manager
        .update_config(json!({ "validation": { "critical_files": ["Cargo.lock"] } }))
        .unwrap();
    assert_eq!(manager.auto_detect_project(), Some("rust"));

    let config = manager.get_config();
    assert_eq!(config.validation.critical_files, vec!["Cargo.lock"]);
    assert_eq!(config.directories.test_root, "tests");
}

#[test]
fn test_project_name_falls_back_to_directory() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("my-app");
    std::fs::create_dir(&root).unwrap();
    assert_eq!(TrinityFullConfig::default().project_name(&root), "my-app");
}
