use super::settings::Settings;
use super::{from_args, load_config};
use serial_test::serial;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.session.url, "ws://127.0.0.1:8080");
    assert_eq!(settings.session.vpn_name, "default");
    assert_eq!(settings.request.destination, "tutorial/requests");
    assert_eq!(settings.request.queue_name, "tutorial/queue");
    assert_eq!(settings.request.reply_timeout_secs, 5);
}

#[test]
fn test_from_args_builds_session() {
    let args: Vec<String> = ["broker.example.com:55443", "alice", "secret", "tutorial"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let settings = from_args(&args).expect("four args should parse");
    assert_eq!(settings.session.url, "ws://broker.example.com:55443");
    assert_eq!(settings.session.username, "alice");
    assert_eq!(settings.session.password, "secret");
    assert_eq!(settings.session.vpn_name, "tutorial");
    // Request defaults are untouched by the positional form
    assert_eq!(settings.request.destination, "tutorial/requests");
}

#[test]
fn test_from_args_rejects_missing_arguments() {
    let args: Vec<String> = ["broker:55443", "alice"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert!(from_args(&args).is_none());
    assert!(from_args(&[]).is_none());
}

#[test]
#[serial]
fn test_env_overrides_session_url() {
    temp_env::with_var("SESSION_URL", Some("ws://10.0.0.1:9000"), || {
        let settings = load_config().expect("config should load");
        assert_eq!(settings.session.url, "ws://10.0.0.1:9000");
        // Everything else still falls back to defaults
        assert_eq!(settings.request.reply_timeout_secs, 5);
    });
}

#[test]
#[serial]
fn test_load_config_without_sources_uses_defaults() {
    let settings = load_config().expect("config should load");
    assert_eq!(settings.session.username, "default");
    assert_eq!(settings.request.queue_name, "tutorial/queue");
}
