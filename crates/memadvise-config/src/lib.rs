use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::ReentrantMutex;
use thiserror::Error;

mod logging;

pub use logging::{init_tracing, LoggingConfig};

/// A byte count that may be written either as an integer or as a
/// human-friendly string (`"512MiB"`, `"2G"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteSize(pub u64);

impl Serialize for ByteSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bytes(u64),
            Human(String),
        }

        let repr = Repr::deserialize(deserializer)?;
        match repr {
            Repr::Bytes(value) => Ok(ByteSize(value)),
            Repr::Human(value) => memadvise_memory::parse_byte_size(&value)
                .map(ByteSize)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Defaults for a reclaim run. Command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReclaimConfig {
    /// Percentage of resident memory to target. Values outside `1..=100`
    /// fall back to 30 when the budget is computed.
    #[serde(default = "ReclaimConfig::default_percent")]
    pub percent: i64,

    /// Advisory mode, `cold` or `pageout`. Validated by the caller so an
    /// invalid value is reported the same way as an invalid `--mode`.
    #[serde(default = "ReclaimConfig::default_mode")]
    pub mode: String,

    /// Hard cap on the number of bytes advised per process. `0` disables the
    /// cap.
    #[serde(default)]
    pub max_bytes: ByteSize,
}

impl ReclaimConfig {
    fn default_percent() -> i64 {
        memadvise_memory::DEFAULT_RECLAIM_PERCENT
    }

    fn default_mode() -> String {
        "cold".to_owned()
    }
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            percent: Self::default_percent(),
            mode: Self::default_mode(),
            max_bytes: ByteSize::default(),
        }
    }
}

/// Top-level `memadvise.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemadviseConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reclaim: ReclaimConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

fn sanitize_toml_error_message(message: &str) -> String {
    // `toml::de::Error::message()` can include user-provided scalar values, e.g.
    // `invalid type: string "secret", expected a boolean`. Redact quoted substrings so config
    // contents never end up in logs verbatim.
    static QUOTED_STRING_RE: OnceLock<Option<regex::Regex>> = OnceLock::new();
    static SINGLE_QUOTED_STRING_RE: OnceLock<Option<regex::Regex>> = OnceLock::new();

    let mut out = message.to_owned();
    if let Some(re) = QUOTED_STRING_RE
        .get_or_init(|| regex::Regex::new(r#""(?:\\.|[^"\\])*""#).ok())
        .as_ref()
    {
        out = re.replace_all(&out, r#""<redacted>""#).into_owned();
    }
    if let Some(re) = SINGLE_QUOTED_STRING_RE
        .get_or_init(|| regex::Regex::new(r"'(?:\\.|[^'\\])*'").ok())
        .as_ref()
    {
        out = re.replace_all(&out, "'<redacted>'").into_owned();
    }
    out
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` includes a source snippet; keep only the message.
        ConfigError::Toml(sanitize_toml_error_message(err.message()))
    }
}

impl MemadviseConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

pub const MEMADVISE_CONFIG_ENV_VAR: &str = "MEMADVISE_CONFIG_PATH";

static CONFIG_ENV_LOCK: OnceLock<ReentrantMutex<()>> = OnceLock::new();

fn config_env_lock() -> &'static ReentrantMutex<()> {
    CONFIG_ENV_LOCK.get_or_init(|| ReentrantMutex::new(()))
}

/// Run `f` while holding the config environment lock.
///
/// Tests that temporarily set [`MEMADVISE_CONFIG_ENV_VAR`] wrap the mutation
/// and the discovery call in this helper so concurrent tests do not observe
/// each other's overrides.
pub fn with_config_env_lock<R>(f: impl FnOnce() -> R) -> R {
    let _guard = config_env_lock().lock();
    f()
}

/// Discover the config file relative to `cwd`.
///
/// Search order:
/// 1) `MEMADVISE_CONFIG_PATH` (absolute or relative to `cwd`)
/// 2) `memadvise.toml` in `cwd`
/// 3) `$XDG_CONFIG_HOME/memadvise/config.toml` (or `~/.config/...`)
pub fn discover_config_path(cwd: &Path) -> Option<PathBuf> {
    let _guard = config_env_lock().lock();
    if let Some(value) = std::env::var_os(MEMADVISE_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            cwd.join(candidate)
        };
        return Some(path);
    }

    let local = cwd.join("memadvise.toml");
    if local.is_file() {
        return Some(local);
    }

    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|path| path.is_absolute())
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    let user = config_home.join("memadvise").join("config.toml");
    user.is_file().then_some(user)
}

/// Load the effective configuration.
///
/// An explicit path always wins; otherwise [`discover_config_path`] is
/// consulted. When no file is found, returns [`MemadviseConfig::default`] and
/// `None`.
pub fn load_config(
    explicit: Option<&Path>,
    cwd: &Path,
) -> Result<(MemadviseConfig, Option<PathBuf>), ConfigError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config_path(cwd),
    };
    let Some(path) = path else {
        return Ok((MemadviseConfig::default(), None));
    };

    let config = MemadviseConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}
