use std::path::PathBuf;

use memadvise_config::{ByteSize, ConfigError, MemadviseConfig};

#[test]
fn empty_document_yields_defaults() {
    let config = MemadviseConfig::load_from_str("").unwrap();
    assert_eq!(config.reclaim.percent, 30);
    assert_eq!(config.reclaim.mode, "cold");
    assert_eq!(config.reclaim.max_bytes, ByteSize(0));
    assert_eq!(config.logging.level, "warn");
    assert!(!config.logging.json);
    assert!(config.logging.stderr);
    assert_eq!(config.logging.file, None);
}

#[test]
fn parses_full_document() {
    let text = r#"
[logging]
level = "memadvise.process=debug"
json = true
file = "/tmp/memadvise.log"

[reclaim]
percent = 55
mode = "pageout"
max_bytes = "512MiB"
"#;
    let config = MemadviseConfig::load_from_str(text).unwrap();
    assert_eq!(config.logging.level, "memadvise.process=debug");
    assert!(config.logging.json);
    assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/memadvise.log")));
    assert_eq!(config.reclaim.percent, 55);
    assert_eq!(config.reclaim.mode, "pageout");
    assert_eq!(config.reclaim.max_bytes, ByteSize(512 * 1024 * 1024));
}

#[test]
fn max_bytes_accepts_plain_integers() {
    let config = MemadviseConfig::load_from_str("[reclaim]\nmax_bytes = 4096\n").unwrap();
    assert_eq!(config.reclaim.max_bytes, ByteSize(4096));
}

#[test]
fn max_bytes_rejects_garbage() {
    let err = MemadviseConfig::load_from_str("[reclaim]\nmax_bytes = \"lots\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)), "{err}");
}

#[test]
fn unknown_keys_are_rejected() {
    let err = MemadviseConfig::load_from_str("[reclaim]\npercnet = 10\n").unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, ConfigError::Toml(_)));
    assert!(message.contains("percnet"), "{message}");
}

#[test]
fn out_of_range_percent_is_kept_verbatim() {
    // Clamping happens when the budget is computed, not at load time.
    let config = MemadviseConfig::load_from_str("[reclaim]\npercent = 250\n").unwrap();
    assert_eq!(config.reclaim.percent, 250);
}
