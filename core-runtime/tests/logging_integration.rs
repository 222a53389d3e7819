//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::logging::{strip_locator, strip_path, LogFormat, LoggingConfig};

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, LogLevel::Info);
    assert!(config.redact_locators);
    assert!(config.filter.is_none());
    assert!(config.logger_sink.is_none());
    assert!(config.display_target);
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_locator_redaction(false)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.redact_locators);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}

#[test]
fn test_media_locators_are_stripped() {
    assert_eq!(
        strip_locator("content://media/external/audio/media/1234"),
        "1234"
    );
    assert_eq!(
        strip_locator("file:///storage/emulated/0/Music/Artist/track.mp3"),
        "track.mp3"
    );
    assert_eq!(strip_locator("track.mp3"), "track.mp3");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/storage/emulated/0/Music/song.mp3"), "song.mp3");
    assert_eq!(strip_path("D:\\data\\file.txt"), "file.txt");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_init_logging_only_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_filter("core_runtime=debug");

    core_runtime::logging::init_logging(config.clone()).unwrap();
    tracing::debug!(target: "core_runtime", "logging ready");

    let second = core_runtime::logging::init_logging(config);
    assert!(matches!(second, Err(core_runtime::Error::Config(_))));
}
