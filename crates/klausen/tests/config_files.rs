use std::fs;

use klausen::{
    declaration_from_json_str, declaration_from_yaml_str, load_config, load_declaration, Engine,
    EngineConfig, KlausenError,
};
use tempfile::tempdir;

const YAML: &str = r#"
bar:
  uncertainty_type: 3
  loc: 2
  scale: 0.5
foo:
  uncertainty_type: triangular
  minimum: 0
  loc: 1
  maximum: 2
  comment: ignored
"#;

#[test]
fn yaml_declarations_keep_file_order() {
    let declaration = declaration_from_yaml_str(YAML).unwrap();
    assert_eq!(declaration.keys().collect::<Vec<_>>(), ["bar", "foo"]);
    let mut engine = Engine::declare(declaration).unwrap();
    engine.static_values();
    assert_eq!(engine["foo"], 1.0);
    assert_eq!(engine["bar"], 2.0);
}

#[test]
fn json_declarations_parse() {
    let declaration = declaration_from_json_str(
        r#"{"w": {"uncertainty_type": "empirical", "sample": [1, 2, 3], "metadata": {"src": "x"}}}"#,
    )
    .unwrap();
    let engine = Engine::declare(declaration).unwrap();
    assert_eq!(engine.metadata("w").unwrap()["src"], "x");
}

#[test]
fn declaration_files_load_by_extension() {
    let dir = tempdir().unwrap();
    let yaml_path = dir.path().join("params.yaml");
    fs::write(&yaml_path, YAML).unwrap();
    let json_path = dir.path().join("params.json");
    fs::write(
        &json_path,
        r#"{"k": {"uncertainty_type": 0, "loc": 4.0}}"#,
    )
    .unwrap();

    assert_eq!(load_declaration(&yaml_path).unwrap().len(), 2);
    let mut engine = Engine::from_path(&json_path, EngineConfig::default()).unwrap();
    engine.stochastic(3, Some(0)).unwrap();
    assert_eq!(engine["k"], klausen::ParameterValue::Vector(vec![4.0; 3]));
}

#[test]
fn unreadable_and_malformed_files_are_config_errors() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    match load_declaration(&missing) {
        Err(KlausenError::Config(info)) => assert_eq!(info.code, "config-read"),
        other => panic!("expected config error, got {other:?}"),
    }

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    match load_declaration(&broken) {
        Err(KlausenError::Config(info)) => {
            assert_eq!(info.code, "config-json-parse");
            assert!(info.context.contains_key("path"));
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn engine_config_defaults_and_overrides() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("engine.yaml");
    fs::write(
        &path,
        "default_iterations: 250\nseed_policy:\n  master_seed: 42\ntruncation:\n  max_attempts: 50\n",
    )
    .unwrap();
    let config = load_config(&path).unwrap();
    assert_eq!(config.default_iterations, 250);
    assert_eq!(config.seed_policy.master_seed, Some(42));
    assert_eq!(config.truncation.max_attempts, 50);

    let empty: EngineConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(empty, EngineConfig::default());
    assert_eq!(empty.default_iterations, 1000);
}

#[test]
fn declaration_failures_from_files_stay_specification_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "x:\n  uncertainty_type: 5\n  minimum: 2\n  loc: 1\n  maximum: 3\n").unwrap();
    let err = Engine::from_path(&path, EngineConfig::default()).unwrap_err();
    match err {
        KlausenError::Specification(info) => {
            assert_eq!(info.code, "spec-loc-out-of-bounds");
            assert_eq!(info.context["parameter"], "x");
        }
        other => panic!("expected specification error, got {other:?}"),
    }
}
