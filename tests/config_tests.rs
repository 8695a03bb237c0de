use hatenapost::config::{get_config_dir, Config};
use std::fs;

#[test]
fn test_config_dir_exists() {
    let config_dir = get_config_dir().expect("Should get config dir");
    assert!(config_dir.to_str().unwrap().contains("hatenapost"));
}

#[test]
fn test_config_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = Config {
        consumer_key: "ck".to_string(),
        consumer_secret: "cs".to_string(),
        access_token: "at".to_string(),
        access_token_secret: "ats".to_string(),
        entry_url: "https://blog.hatena.ne.jp/alice/alice.hatenablog.com/atom/entry".to_string(),
        author: Some("alice".to_string()),
        preset_categories: vec!["カテゴリー1".to_string(), "カテゴリー2".to_string()],
    };

    config.save(&path).expect("Should save config");
    let loaded = Config::from_file(&path).expect("Should load config");
    assert_eq!(loaded, config);
}

#[test]
fn test_client_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
consumer_key = "ck"
consumer_secret = "cs"
access_token = "at"
access_token_secret = "ats"
entry_url = " https://blog.hatena.ne.jp/alice/alice.hatenablog.com/atom/entry "
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    let client = config.client().expect("Complete config should build a client");
    assert_eq!(
        client.endpoint(),
        "https://blog.hatena.ne.jp/alice/alice.hatenablog.com/atom/entry"
    );

    let secrets = config.signing_secrets();
    assert_eq!(secrets.client_key, "ck");
    assert_eq!(secrets.resource_owner_secret, "ats");
}

#[test]
fn test_template_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    Config::template().save(&path).unwrap();

    let config = Config::from_file(&path).unwrap();
    let err = config.client().err().expect("Placeholders should fail validation");
    let message = err.to_string();
    let keys = [
        "consumer_key",
        "consumer_secret",
        "access_token",
        "access_token_secret",
        "entry_url",
    ];
    for key in keys {
        assert!(message.contains(key), "{} missing from {:?}", key, message);
    }
}

#[test]
fn test_unparsable_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "consumer_key = [").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(format!("{:?}", err).contains("Failed to parse config file"));
}
