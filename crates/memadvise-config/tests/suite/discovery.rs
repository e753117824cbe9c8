use std::ffi::OsString;

use memadvise_config::{
    discover_config_path, load_config, with_config_env_lock, ConfigError, MemadviseConfig,
    MEMADVISE_CONFIG_ENV_VAR,
};
use tempfile::tempdir;

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &std::path::Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_memadvise_toml_in_cwd() {
    with_config_env_lock(|| {
        let cwd = tempdir().unwrap();
        let xdg = tempdir().unwrap();
        let _env = EnvVarGuard::unset(MEMADVISE_CONFIG_ENV_VAR);
        let _xdg = EnvVarGuard::set("XDG_CONFIG_HOME", xdg.path());

        let local = cwd.path().join("memadvise.toml");
        std::fs::write(&local, "[reclaim]\npercent = 40\n").unwrap();

        assert_eq!(discover_config_path(cwd.path()), Some(local));
    });
}

#[test]
fn env_var_overrides_local_file() {
    with_config_env_lock(|| {
        let cwd = tempdir().unwrap();
        std::fs::write(cwd.path().join("memadvise.toml"), "").unwrap();
        let other = cwd.path().join("custom.toml");
        std::fs::write(&other, "").unwrap();

        let _env = EnvVarGuard::set(MEMADVISE_CONFIG_ENV_VAR, std::path::Path::new("custom.toml"));
        assert_eq!(discover_config_path(cwd.path()), Some(other));
    });
}

#[test]
fn falls_back_to_xdg_config_home() {
    with_config_env_lock(|| {
        let cwd = tempdir().unwrap();
        let xdg = tempdir().unwrap();
        let _env = EnvVarGuard::unset(MEMADVISE_CONFIG_ENV_VAR);
        let _xdg = EnvVarGuard::set("XDG_CONFIG_HOME", xdg.path());

        assert_eq!(discover_config_path(cwd.path()), None);

        let user = xdg.path().join("memadvise").join("config.toml");
        std::fs::create_dir_all(user.parent().unwrap()).unwrap();
        std::fs::write(&user, "[reclaim]\nmode = \"pageout\"\n").unwrap();

        assert_eq!(discover_config_path(cwd.path()), Some(user.clone()));

        let (config, path) = load_config(None, cwd.path()).unwrap();
        assert_eq!(path, Some(user));
        assert_eq!(config.reclaim.mode, "pageout");
    });
}

#[test]
fn load_config_without_any_file_uses_defaults() {
    with_config_env_lock(|| {
        let cwd = tempdir().unwrap();
        let xdg = tempdir().unwrap();
        let _env = EnvVarGuard::unset(MEMADVISE_CONFIG_ENV_VAR);
        let _xdg = EnvVarGuard::set("XDG_CONFIG_HOME", xdg.path());

        let (config, path) = load_config(None, cwd.path()).unwrap();
        assert_eq!(path, None);
        assert_eq!(config, MemadviseConfig::default());
    });
}

#[test]
fn explicit_path_wins_and_missing_file_is_io_error() {
    with_config_env_lock(|| {
        let cwd = tempdir().unwrap();
        std::fs::write(cwd.path().join("memadvise.toml"), "[reclaim]\npercent = 10\n").unwrap();

        let explicit = cwd.path().join("explicit.toml");
        std::fs::write(&explicit, "[reclaim]\npercent = 75\n").unwrap();
        let (config, path) = load_config(Some(&explicit), cwd.path()).unwrap();
        assert_eq!(path.as_deref(), Some(explicit.as_path()));
        assert_eq!(config.reclaim.percent, 75);

        let missing = cwd.path().join("missing.toml");
        let err = load_config(Some(&missing), cwd.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "{err}");
    });
}
