use screengrab_capture::config::{BrowserSettings, DevServerSettings};
use screengrab_capture::{Error, GrabberConfig, Settings, Target, Viewport};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn empty_settings_file_gives_defaults() {
    let settings = Settings::from_toml("").expect("parse");
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.dev_server.command, "ng");
    assert_eq!(settings.dev_server.args, vec!["serve", "--port", "{port}"]);
    assert_eq!(settings.dev_server.shutdown_timeout(), Duration::from_secs(5));
    assert!(settings.browser.sandbox);
    assert!(settings.browser.chrome_path.is_none());
}

#[test]
fn partial_settings_keep_other_defaults() {
    let settings = Settings::from_toml(
        r#"
        [browser]
        chrome_path = "/usr/bin/chromium"
        sandbox = false
        extra_args = ["--force-device-scale-factor=1"]

        [dev_server]
        command = "npx"
        "#,
    )
    .expect("parse");

    assert_eq!(
        settings.browser,
        BrowserSettings {
            chrome_path: Some(PathBuf::from("/usr/bin/chromium")),
            sandbox: false,
            extra_args: vec!["--force-device-scale-factor=1".to_string()],
        }
    );
    assert_eq!(settings.dev_server.command, "npx");
    assert_eq!(settings.dev_server.shutdown_timeout_secs, 5);
}

#[test]
fn malformed_settings_are_rejected() {
    let err = Settings::from_toml("[browser]\nsandbox = \"maybe\"").unwrap_err();
    assert!(matches!(err, Error::Settings(_)));
}

#[test]
fn explicit_missing_settings_file_is_an_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let err = Settings::load(Some(tmp.path().join("nope.toml").as_path())).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
}

#[test]
fn explicit_settings_file_is_loaded() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[dev_server]\nshutdown_timeout_secs = 2\n").expect("write");

    let settings = Settings::load(Some(path.as_path())).expect("load");
    assert_eq!(settings.dev_server.shutdown_timeout(), Duration::from_secs(2));
}

#[test]
fn port_placeholder_is_substituted() {
    let settings = DevServerSettings {
        command: "npm".to_string(),
        args: vec![
            "run".to_string(),
            "start".to_string(),
            "--".to_string(),
            "--port={port}".to_string(),
        ],
        shutdown_timeout_secs: 1,
    };
    assert_eq!(
        settings.args_for_port(4321),
        vec!["run", "start", "--", "--port=4321"]
    );
}

#[test]
fn target_resolves_url() {
    assert_eq!(
        Target::Url("https://example.org/dash".to_string()).url(),
        "https://example.org/dash"
    );
    let target = Target::DevServer {
        project: PathBuf::from("."),
        port: 4200,
    };
    assert_eq!(target.url(), "http://localhost:4200");
}

#[test]
fn default_config_is_valid() {
    let config = GrabberConfig::new(Target::Url("http://example.test".to_string()));
    config.validate().expect("valid");
    assert_eq!(config.viewport, Viewport::new(800, 480));
    assert_eq!(config.output_dir, PathBuf::from("./out"));
}

#[test]
fn validation_rejects_bad_values() {
    let base = GrabberConfig::new(Target::Url("http://example.test".to_string()));

    let mut config = base.clone();
    config.interval = Duration::ZERO;
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

    let mut config = base.clone();
    config.viewport = Viewport::new(0, 480);
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

    let mut config = base.clone();
    config.target = Target::Url("   ".to_string());
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

    let mut config = base;
    config.target = Target::DevServer {
        project: PathBuf::from("/definitely/not/a/project"),
        port: 4200,
    };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn zero_delay_is_allowed() {
    let mut config = GrabberConfig::new(Target::Url("http://example.test".to_string()));
    config.delay = Duration::ZERO;
    config.validate().expect("valid");
}
