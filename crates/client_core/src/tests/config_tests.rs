use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("doc_chat_config_test_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join(CONFIG_FILE_NAME);
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn defaults_point_at_local_service() {
    let settings = load_settings_with(None, no_env).expect("defaults");
    assert_eq!(settings, Settings::default());
    assert_eq!(
        settings.server_url().expect("url").as_str(),
        "http://127.0.0.1:8000/"
    );
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(120)));
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config("server_url = \"http://10.0.0.2:9000\"\nrequest_timeout_secs = 30\n");

    let settings = load_settings_with(Some(&path), no_env).expect("load");
    assert_eq!(settings.server_url, "http://10.0.0.2:9000");
    assert_eq!(settings.request_timeout_secs, 30);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let path = temp_config("server_url = \"http://from-file:1\"\n");
    let vars = HashMap::from([
        ("DOC_CHAT_SERVER_URL", "http://from-env:2"),
        ("APP__SERVER_URL", "http://from-app-env:3"),
        ("APP__REQUEST_TIMEOUT_SECS", "0"),
    ]);

    let settings = load_settings_with(Some(&path), |name| {
        vars.get(name).map(|v| v.to_string())
    })
    .expect("load");
    assert_eq!(settings.server_url, "http://from-app-env:3");
    assert_eq!(settings.request_timeout(), None);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn invalid_timeout_env_is_ignored() {
    let settings = load_settings_with(None, |name| {
        (name == "APP__REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
    })
    .expect("load");
    assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn rejects_unparseable_and_non_http_urls() {
    let err = load_settings_with(None, |name| {
        (name == "APP__SERVER_URL").then(|| "not a url".to_string())
    })
    .expect_err("must fail");
    assert!(matches!(err, ConfigError::InvalidServerUrl { .. }));

    let settings = Settings {
        server_url: "ftp://files.example".into(),
        ..Settings::default()
    };
    assert!(matches!(
        settings.server_url(),
        Err(ConfigError::UnsupportedScheme(_))
    ));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let path = env::temp_dir().join("doc_chat_definitely_missing").join(CONFIG_FILE_NAME);
    let err = load_settings(Some(&path)).expect_err("must fail");
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let path = temp_config("request_timeout_secs = \"ten\"\n");
    let err = load_settings_with(Some(&path), no_env).expect_err("must fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn cli_overrides_take_precedence() {
    let mut settings = Settings::default();
    settings.apply_overrides(Some("http://cli:4".into()), Some(5));
    assert_eq!(settings.server_url, "http://cli:4");
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(5)));

    settings.apply_overrides(None, None);
    assert_eq!(settings.server_url, "http://cli:4");
}
