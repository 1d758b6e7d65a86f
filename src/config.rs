#![forbid(unsafe_code)]

use anyhow::{Context, Result, anyhow, bail};
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::collector::DEFAULT_PROGRESS_EVERY;
use crate::extract::FieldSelectors;
use crate::fetch::DEFAULT_USER_AGENT;
use crate::video::DEFAULT_SITE_BASE;

pub const DEFAULT_ENV_PATH: &str = ".env";
pub const DEFAULT_OUTPUT: &str = "videos.csv";
pub const DEFAULT_WORKERS: usize = 1;

#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub site_base: String,
    pub output: PathBuf,
    pub workers: usize,
    pub progress_every: usize,
    pub user_agent: String,
    pub timeout: Option<Duration>,
    pub selectors_path: Option<PathBuf>,
}

impl CollectorSettings {
    /// Selector profile from `selectors_path`, or the built-in selectors.
    pub fn selectors(&self) -> Result<FieldSelectors> {
        match &self.selectors_path {
            Some(path) => FieldSelectors::from_toml_file(path),
            None => Ok(FieldSelectors::default()),
        }
    }
}

/// Values given on the command line. They beat both the process environment
/// and the env file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub site_base: Option<String>,
    pub output: Option<PathBuf>,
    pub workers: Option<usize>,
    pub progress_every: Option<usize>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub selectors_path: Option<PathBuf>,
    pub env_path: Option<PathBuf>,
}

pub fn resolve_settings(overrides: SettingsOverrides) -> Result<CollectorSettings> {
    let env_path = overrides
        .env_path
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_ENV_PATH));
    let file_vars = read_env_file(env_path)?;
    build_settings_with_overrides(&file_vars, env_var_string, overrides)
}

#[cfg(test)]
fn build_settings(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
) -> Result<CollectorSettings> {
    build_settings_with_overrides(file_vars, env_lookup, SettingsOverrides::default())
}

fn build_settings_with_overrides(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
    overrides: SettingsOverrides,
) -> Result<CollectorSettings> {
    let site_base = non_blank(overrides.site_base)
        .or_else(|| lookup_value("COLLECTOR_SITE_BASE", file_vars, &env_lookup))
        .unwrap_or_else(|| DEFAULT_SITE_BASE.to_string());
    if !(site_base.starts_with("http://") || site_base.starts_with("https://")) {
        bail!("COLLECTOR_SITE_BASE must be an http(s) URL, got {site_base:?}");
    }
    let output = overrides
        .output
        .or_else(|| lookup_value("COLLECTOR_OUTPUT", file_vars, &env_lookup).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let workers = overrides
        .workers
        .or_else(|| parse_count("COLLECTOR_WORKERS", file_vars, &env_lookup))
        .filter(|workers| *workers > 0)
        .unwrap_or(DEFAULT_WORKERS);
    let progress_every = overrides
        .progress_every
        .or_else(|| parse_count("COLLECTOR_PROGRESS_EVERY", file_vars, &env_lookup))
        .filter(|every| *every > 0)
        .unwrap_or(DEFAULT_PROGRESS_EVERY);
    let user_agent = non_blank(overrides.user_agent)
        .or_else(|| lookup_value("COLLECTOR_USER_AGENT", file_vars, &env_lookup))
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let timeout_secs = match overrides.timeout_secs {
        Some(secs) => Some(secs),
        None => lookup_timeout(file_vars, &env_lookup)?,
    };
    let selectors_path = overrides
        .selectors_path
        .or_else(|| lookup_value("COLLECTOR_SELECTORS", file_vars, &env_lookup).map(PathBuf::from));

    Ok(CollectorSettings {
        site_base,
        output,
        workers,
        progress_every,
        user_agent,
        timeout: timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs),
        selectors_path,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_count(
    key: &str,
    file_vars: &HashMap<String, String>,
    env_lookup: &impl Fn(&str) -> Option<String>,
) -> Option<usize> {
    lookup_value(key, file_vars, env_lookup).and_then(|value| value.parse::<usize>().ok())
}

fn lookup_timeout(
    file_vars: &HashMap<String, String>,
    env_lookup: &impl Fn(&str) -> Option<String>,
) -> Result<Option<u64>> {
    let Some(value) = lookup_value("COLLECTOR_TIMEOUT_SECS", file_vars, env_lookup) else {
        return Ok(None);
    };
    let secs = value
        .parse::<u64>()
        .map_err(|_| anyhow!("COLLECTOR_TIMEOUT_SECS must be whole seconds, got {value:?}"))?;
    Ok(Some(secs))
}

fn env_var_string(key: &str) -> Option<String> {
    non_blank(env::var(key).ok())
}

fn lookup_value(
    key: &str,
    file_vars: &HashMap<String, String>,
    env_lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    env_lookup(key).or_else(|| non_blank(file_vars.get(key).cloned()))
}

pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value_raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value_raw.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|value| value.strip_suffix('"'))
            .or_else(|| {
                value
                    .strip_prefix('\'')
                    .and_then(|value| value.strip_suffix('\''))
            })
            .unwrap_or(value);
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}
