use clap::Parser;
use fastdupes::actions::InteractionMode;
use fastdupes::cli::Cli;
use fastdupes::config::{ConfigError, Settings};
use fastdupes::duplicates::CompareMode;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Build the figment by hand so the environment cannot interfere.
    let figment = Figment::from(Serialized::defaults(Settings::default()));
    let settings = Settings::from_figment(&figment).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
mode = "exact"
interaction = "noninteractive"
dry_run = true
prefer = ["*/Burned", "*/Downloads"]
exclude = ["*/node_modules"]
min_size = 4096
chunk_size = 131072
"#,
    )
    .unwrap();

    let figment =
        Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(&config_path));
    let settings = Settings::from_figment(&figment).unwrap();

    assert_eq!(settings.mode, CompareMode::Exact);
    assert_eq!(settings.interaction, InteractionMode::NonInteractive);
    assert!(settings.dry_run);
    assert_eq!(settings.prefer, vec!["*/Burned", "*/Downloads"]);
    assert_eq!(settings.exclude, vec!["*/node_modules"]);
    assert_eq!(settings.min_size, 4096);
    assert_eq!(settings.chunk_size, 131_072);
    assert_eq!(settings.head_size, 16_384);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("FDTEST_MODE", "exact");
    std::env::set_var("FDTEST_IO_THREADS", "16");

    let figment = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Env::prefixed("FDTEST_"));
    let settings = Settings::from_figment(&figment).unwrap();

    assert_eq!(settings.mode, CompareMode::Exact);
    assert_eq!(settings.io_threads, 16);

    std::env::remove_var("FDTEST_MODE");
    std::env::remove_var("FDTEST_IO_THREADS");
}

#[test]
fn test_zero_chunk_size_in_file_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "chunk_size = 0\n").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(&config_path));
    let result = Settings::from_figment(&figment);
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            key: "chunk_size",
            ..
        })
    ));
}

#[test]
fn test_wrong_type_is_a_load_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "mode = \"fuzzy\"\n").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(&config_path));
    assert!(matches!(
        Settings::from_figment(&figment),
        Err(ConfigError::Load(_))
    ));
}

#[test]
fn test_cli_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "mode = \"exact\"\nmin_size = 4096\n").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(&config_path));
    let mut settings = Settings::from_figment(&figment).unwrap();
    let cli = Cli::try_parse_from(["fastdupes", "--min-size", "1KiB", "-e", "-", "/data"]).unwrap();
    settings.apply_cli(&cli);
    settings.validate().unwrap();

    assert_eq!(settings.mode, CompareMode::Exact);
    assert_eq!(settings.min_size, 1024);
    assert!(settings.exclude.is_empty());
}

#[test]
fn test_explicit_missing_config_file() {
    let cli = Cli::try_parse_from([
        "fastdupes",
        "--config",
        "/definitely/not/here.toml",
        "/data",
    ])
    .unwrap();
    assert!(matches!(
        Settings::for_cli(&cli),
        Err(ConfigError::NotFound(_))
    ));
}
