//! Integration tests for the configuration container.
//!
//! These mirror the end-to-end behaviors downstream layers rely on: the
//! construction-time environment merge, object/class/instance filtering,
//! file loading with placeholders, and property interception.

use serial_test::serial;
use std::io::Write;

use xrpc_config::{
    ClassDef, Config, ConfigError, ConfigMap, ConfigSource, InstanceDef, Value, clear_modules,
};

fn sample_class() -> ClassDef {
    ClassDef::new()
        .attr("not_for_config", "should not be used")
        .attr("CONFIG_VALUE", "should be used")
        .computed("ANOTHER_VALUE", |attrs| {
            attrs.get("CONFIG_VALUE").cloned().unwrap_or(Value::None)
        })
        .computed("another_not_for_config", |attrs| {
            attrs.get("not_for_config").cloned().unwrap_or(Value::None)
        })
}

#[test]
#[serial]
fn test_load_from_object() {
    let mut config = Config::new().unwrap();
    config.load_from_object(sample_class());
    assert!(config.contains("CONFIG_VALUE"));
    assert_eq!(
        config.get("CONFIG_VALUE").unwrap(),
        Value::Str("should be used".into())
    );
    assert!(!config.contains("not_for_config"));
}

#[test]
#[serial]
fn test_load_from_instance() {
    let mut config = Config::new().unwrap();
    config.load_from_object(InstanceDef::of(sample_class()));
    assert!(config.contains("CONFIG_VALUE"));
    assert_eq!(
        config.get("ANOTHER_VALUE").unwrap(),
        Value::Str("should be used".into())
    );
    assert!(!config.contains("not_for_config"));
    assert!(!config.contains("another_not_for_config"));
}

#[test]
#[serial]
fn test_load_from_unregistered_dotted_path_is_import_error() {
    clear_modules();
    let mut config = Config::new().unwrap();
    let err = config.load_from_path("test_config.Config.test").unwrap_err();
    assert!(matches!(err, ConfigError::Import { .. }));
}

#[test]
#[serial]
fn test_auto_env_prefix() {
    temp_env::with_vars([("XRPC_TEST_ANSWER", Some("42"))], || {
        let config = Config::new().unwrap();
        assert_eq!(config.get("TEST_ANSWER").unwrap(), Value::Int(42));
    });
}

#[test]
#[serial]
fn test_auto_bool_env_prefix() {
    temp_env::with_vars([("XRPC_TEST_ANSWER", Some("True"))], || {
        let config = Config::new().unwrap();
        assert_eq!(config.get("TEST_ANSWER").unwrap(), Value::Bool(true));
    });
}

#[test]
#[serial]
fn test_empty_env_prefix_falls_back_to_default() {
    temp_env::with_vars([("XRPC_TEST_ANSWER", Some("42"))], || {
        let config = Config::with_defaults(ConfigMap::new(), Some("")).unwrap();
        assert_eq!(config.try_get("TEST_ANSWER"), Some(Value::Int(42)));
        let config = Config::with_defaults(ConfigMap::new(), None).unwrap();
        assert_eq!(config.try_get("TEST_ANSWER"), Some(Value::Int(42)));
    });
}

#[test]
#[serial]
fn test_custom_env_prefix_and_float_values() {
    temp_env::with_vars(
        [
            ("MYAPP_TEST_ANSWER", Some("42")),
            ("MYAPP_TEST_ROI", Some("2.3")),
            ("MYAPP_TEST_TOKEN", Some("somerandomtesttoken")),
        ],
        || {
            let config = Config::with_defaults(ConfigMap::new(), Some("MYAPP_")).unwrap();
            assert_eq!(config.get("TEST_ANSWER").unwrap(), Value::Int(42));
            assert_eq!(config.get("TEST_ROI").unwrap(), Value::Float(2.3));
            assert_eq!(
                config.get("TEST_TOKEN").unwrap(),
                Value::Str("somerandomtesttoken".into())
            );
        },
    );
}

#[test]
#[serial]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("other_config.conf");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
        file,
        concat!(
            "VALUE = 'some value'\n",
            "condition = 1 == 1\n",
            "if condition:\n",
            "    CONDITIONAL = 'should be set'\n",
        )
    )
    .unwrap();

    let mut config = Config::new().unwrap();
    config.load_from_path(path.as_path()).unwrap();
    assert!(config.contains("VALUE"));
    assert_eq!(config.get("VALUE").unwrap(), Value::Str("some value".into()));
    assert!(config.contains("CONDITIONAL"));
    assert_eq!(
        config.get("CONDITIONAL").unwrap(),
        Value::Str("should be set".into())
    );
    assert!(!config.contains("condition"));
}

#[test]
#[serial]
fn test_load_from_missing_file() {
    let mut config = Config::new().unwrap();
    let err = config.load_from_path("/no/such/dir/app.conf").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
#[serial]
fn test_load_from_envvar_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("env_config.conf");
    std::fs::write(&path, "VALUE = 'some value'\n").unwrap();

    temp_env::with_vars(
        [("APP_CONFIG", Some(path.display().to_string()))],
        || {
            let mut config = Config::new().unwrap();
            config.load_from_path("${APP_CONFIG}").unwrap();
            assert!(config.contains("VALUE"));
            assert_eq!(config.get("VALUE").unwrap(), Value::Str("some value".into()));
        },
    );
}

#[test]
#[serial]
fn test_load_from_missing_envvar_enumerates_names() {
    temp_env::with_vars([("MUU_MILK", None::<&str>)], || {
        let mut config = Config::new().unwrap();
        let err = config.load_from_path("${MUU_MILK}").unwrap_err();
        match err {
            ConfigError::MissingEnvVars(names) => assert_eq!(names, vec!["MUU_MILK"]),
            other => panic!("expected MissingEnvVars, got {other:?}"),
        }
        assert_eq!(
            err_text("${MUU_MILK}"),
            "the following environment variables are not set: MUU_MILK"
        );
    });
}

fn err_text(location: &str) -> String {
    let mut config = Config::new().unwrap();
    config.load_from_path(location).unwrap_err().to_string()
}

#[test]
#[serial]
fn test_load_config_from_file_invalid_syntax() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.conf");
    std::fs::write(&path, "VALUE = some value\n").unwrap();

    let mut config = Config::new().unwrap();
    let err = config.load_from_path(path.as_path()).unwrap_err();
    match err {
        ConfigError::FileExec { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected FileExec, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_overwrite_existing_config() {
    let mut config = Config::new().unwrap();
    config.set("DEFAULT", 1);

    config.load_from_object(ClassDef::new().attr("DEFAULT", 2));
    assert_eq!(config.get("DEFAULT").unwrap(), Value::Int(2));
}

#[test]
#[serial]
fn test_overwrite_existing_config_ignores_lowercase() {
    let mut config = Config::new().unwrap();
    config.set("default", 1);

    config.load_from_object(ClassDef::new().attr("default", 2));
    assert_eq!(config.get("default").unwrap(), Value::Int(1));
}

#[test]
#[serial]
fn test_missing_config_key() {
    let config = Config::new().unwrap();
    let err = config.get("NON_EXISTENT").unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey(ref key) if key == "NON_EXISTENT"));
    assert_eq!(err.to_string(), "config has no 'NON_EXISTENT'");
}

#[test]
#[serial]
fn test_update_from_map_and_class() {
    let mut from_map = Config::new().unwrap();
    from_map.update_config(ConfigMap::from([(
        "TEST_SETTING_VALUE".to_string(),
        Value::Int(1),
    )]));
    assert_eq!(from_map["TEST_SETTING_VALUE"], Value::Int(1));

    let mut from_class = Config::new().unwrap();
    from_class.update_config(ClassDef::new().attr("TEST_SETTING_VALUE", 1));
    assert_eq!(from_class["TEST_SETTING_VALUE"], Value::Int(1));
}

#[test]
#[serial]
fn test_update_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app_test_config.conf");
    std::fs::write(&path, "TEST_SETTING_VALUE = 1\n").unwrap();

    let mut config = Config::new().unwrap();
    config.load_from_path(path.as_path()).unwrap();
    assert_eq!(config["TEST_SETTING_VALUE"], Value::Int(1));
}

#[test]
#[serial]
fn test_update_from_lowercase_key_is_dropped() {
    let mut config = Config::new().unwrap();
    config.update_config(ConfigMap::from([(
        "test_setting_value".to_string(),
        Value::Int(1),
    )]));
    assert!(!config.contains("test_setting_value"));
}

#[test]
#[serial]
fn test_declared_property_setter_transforms_before_write() {
    let mut config = Config::new().unwrap();
    config.declare_property(
        "a",
        |config| config.try_get("b"),
        |config, value| {
            let incremented = value.as_int().map(|int| int + 1).unwrap_or_default();
            config.insert("b", incremented);
        },
    );

    config.set("a", 1);
    assert_eq!(config.get("b").unwrap(), Value::Int(2));
    assert_eq!(config.get("a").unwrap(), Value::Int(2));
    // The raw mapping write bypasses the property.
    config.insert("a", 10);
    assert_eq!(config["a"], Value::Int(10));
}

#[test]
#[serial]
fn test_defaults_seed_before_env_merge() {
    temp_env::with_vars([("XRPC_SEEDED", Some("env"))], || {
        let defaults = ConfigMap::from([
            ("SEEDED".to_string(), Value::Str("default".into())),
            ("UNTOUCHED".to_string(), Value::Int(5)),
        ]);
        let config = Config::with_defaults(defaults, None).unwrap();
        // The environment merge runs after the defaults and wins.
        assert_eq!(config["SEEDED"], Value::Str("env".into()));
        assert_eq!(config["UNTOUCHED"], Value::Int(5));
    });
}

#[test]
#[serial]
fn test_source_classification_is_explicit() {
    let source = ConfigSource::from(ConfigMap::from([("KEY".to_string(), Value::Int(1))]));
    assert!(matches!(source, ConfigSource::Map(_)));
}

#[test]
#[serial]
fn test_container_iteration_and_len() {
    temp_env::with_vars([("CNT_ONLY", Some("1"))], || {
        let mut config = Config::with_defaults(ConfigMap::new(), Some("CNT_")).unwrap();
        config.insert("EXTRA", "x");
        assert_eq!(config.len(), 2);
        let keys: Vec<&String> = config.keys().collect();
        assert!(keys.iter().any(|key| *key == "ONLY"));
        let collected: ConfigMap = config
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        assert_eq!(collected["EXTRA"], Value::Str("x".into()));
    });
}
