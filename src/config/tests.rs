use crate::config::{ConfigError, IngestMode, RoutingConfig, ServerConfig};
use crate::reddit::TimeWindow;
use std::collections::HashMap;
use std::io::Write;
use tempfile::NamedTempFile;

const MINIMAL: &str = r#"
username: kenny
password: hunter2
clientid: abc
clientsecret: def
bottoken: "123:XYZ"
"#;

#[test]
fn test_defaults_applied() {
    let config = ServerConfig::from_yaml(MINIMAL).unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.port, 5000);
    assert_eq!(config.poll_timeout, 20);
    assert_eq!(config.poll_interval_ms, 250);
    assert_eq!(config.token_refresh_minutes, 45);
    assert_eq!(config.listing_window, TimeWindow::Week);
    assert_eq!(config.listing_limit, 5);
    assert_eq!(config.bot_username, "kungfu_kenny_bot");
    assert_eq!(config.token_refresh_interval().as_secs(), 45 * 60);
    assert_eq!(config.request_timeout().as_secs(), 30);
    assert_eq!(config.dispatch_timeout().as_secs(), 90);
}

#[test]
fn test_validation_rejects_zero_timeouts() {
    let mut config = ServerConfig::from_yaml(MINIMAL).unwrap();
    config.request_timeout_secs = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = ServerConfig::from_yaml(MINIMAL).unwrap();
    config.dispatch_timeout_secs = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_validation_missing_credentials() {
    let mut config = ServerConfig::from_yaml(MINIMAL).unwrap();
    config.bottoken = "".to_string();

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("bottoken"));

    let config = ServerConfig::from_yaml("username: kenny\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_validation_listing_limit() {
    let mut config = ServerConfig::from_yaml(MINIMAL).unwrap();
    config.listing_limit = 0;
    assert!(config.validate().is_err());

    config.listing_limit = 101;
    assert!(config.validate().is_err());

    config.listing_limit = 100;
    assert!(config.validate().is_ok());
}

#[test]
fn test_ingest_mode_polling_without_remote() {
    let mut config = ServerConfig::from_yaml(MINIMAL).unwrap();
    assert_eq!(config.ingest_mode().unwrap(), IngestMode::Polling);

    // Only one of the two set is still polling
    config.remote = Some("bot.example.com".to_string());
    assert_eq!(config.ingest_mode().unwrap(), IngestMode::Polling);

    config.remote = None;
    config.servercert = Some("cert.pem".to_string());
    assert_eq!(config.ingest_mode().unwrap(), IngestMode::Polling);

    config.remote = Some("   ".to_string());
    assert_eq!(config.ingest_mode().unwrap(), IngestMode::Polling);
}

#[test]
fn test_ingest_mode_webhook() {
    let mut config = ServerConfig::from_yaml(MINIMAL).unwrap();
    config.remote = Some("bot.example.com:8443".to_string());
    config.servercert = Some("etc/cert.pem".to_string());

    match config.ingest_mode().unwrap() {
        IngestMode::Webhook(target) => {
            assert_eq!(target.url, "https://bot.example.com:8443/123:XYZ");
            assert_eq!(target.path, "/123:XYZ");
            assert_eq!(target.port, 5000);
            assert!(target.certificate.is_absolute());
            assert!(target.certificate.ends_with("etc/cert.pem"));
        }
        other => panic!("expected webhook mode, got {:?}", other),
    }
}

#[test]
fn test_load_expands_env() {
    std::env::set_var("LUMBER_BOT_TEST_SECRET", "from-env");
    std::env::set_var("LUMBER_BOT_TEST_USER", "kenny-env");
    std::env::set_var("LUMBER_BOT_TEST_CLIENT", "abc-env");

    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "username: ${{LUMBER_BOT_TEST_USER}}\npassword: pw\nclientid: $LUMBER_BOT_TEST_CLIENT\nclientsecret: ${{LUMBER_BOT_TEST_SECRET}}\nbottoken: t\n"
    )
    .unwrap();

    let config = ServerConfig::load(file.path()).unwrap();
    assert_eq!(config.username, "kenny-env");
    assert_eq!(config.clientid, "abc-env");
    assert_eq!(config.clientsecret, "from-env");
    assert_eq!(config.password, "pw");
}

#[test]
fn test_load_missing_file() {
    let err = ServerConfig::load(std::path::Path::new("/nonexistent/serverconf.yaml"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_load_invalid_yaml() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "username: [unterminated").unwrap();

    let err = ServerConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_routing_table_from_yaml() {
    let routing: RoutingConfig = serde_yaml::from_str(
        r#"
default: [earthporn, spaceporn]
custom:
  - chats: [42, 43]
    subreddits: [cityporn]
  - chats: [43]
    subreddits: [" architectureporn "]
"#,
    )
    .unwrap();

    let table = routing.into_table().unwrap();
    assert_eq!(table.default_channels(), ["earthporn", "spaceporn"]);
    assert_eq!(table.channels_for(42), ["cityporn"]);
    // Later block wins, names are trimmed
    assert_eq!(table.channels_for(43), ["architectureporn"]);
    assert_eq!(table.channels_for(7), ["earthporn", "spaceporn"]);
    assert_eq!(table.override_count(), 2);
}

#[test]
fn test_routing_rejects_empty_lists() {
    let routing: RoutingConfig = serde_yaml::from_str("custom: []\n").unwrap();
    let err = routing.into_table().unwrap_err();
    assert!(matches!(err, ConfigError::EmptyChannelList(ref owner) if owner == "default"));

    let routing: RoutingConfig = serde_yaml::from_str(
        "default: [earthporn]\ncustom:\n  - chats: [9]\n    subreddits: ['', '  ']\n",
    )
    .unwrap();
    let err = routing.into_table().unwrap_err();
    assert!(err.to_string().contains("chat 9"));

    let mut overrides = HashMap::new();
    overrides.insert(1, vec![]);
    assert!(crate::config::ChannelRoutingTable::new(vec!["a".into()], overrides).is_err());
}
