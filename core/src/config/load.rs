use std::path::Path;

use crate::error::ConfigError;

use super::types::AppConfig;

pub const DEFAULT_CONFIG_FILE: &str = "vmtest.toml";

/// Loads `path`, or `vmtest.toml` from the working directory if present,
/// or defaults. Environment overrides are applied before validation.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut cfg = match path {
        Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.display().to_string())),
        Some(p) => read_file(p)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => read_file(Path::new(DEFAULT_CONFIG_FILE))?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn from_toml_str(s: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str::<AppConfig>(s).map_err(ConfigError::Parse)
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    from_toml_str(&s)
}

fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = non_empty(lookup("VMTEST_TIMEOUT_SECS")) {
        cfg.engine.timeout_secs = parse_env("VMTEST_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = non_empty(lookup("VMTEST_DEBUG_PORT")) {
        cfg.engine.debug_port = Some(parse_env("VMTEST_DEBUG_PORT", &v)?);
    }
    if let Some(v) = non_empty(lookup("VMTEST_LOCAL_TEMP")) {
        cfg.engine.local_temp = v.into();
    }
    Ok(())
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::EnvInvalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}
