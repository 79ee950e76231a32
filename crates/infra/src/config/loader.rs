//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Environment variables, when `CADENCE_AI_DEFAULT_PROVIDER` is set
//! 2. Otherwise the first config file found by [`probe_config_paths`]
//! 3. API keys are then resolved and the snapshot validated
//!
//! ## Environment Variables
//! - `CADENCE_AI_DEFAULT_PROVIDER`: provider used when a call names none (required)
//! - `CADENCE_AI_FALLBACK`: comma-separated fallback chain
//! - `CADENCE_AI_FALLBACK_ENABLED`: whether the chain is used (default true)
//! - `OLLAMA_HOST`, `CADENCE_OLLAMA_MODEL`
//! - `ANTHROPIC_API_KEY`, `CADENCE_CLAUDE_MODEL`
//! - `OPENAI_API_KEY`, `CADENCE_OPENAI_MODEL`
//! - `GROQ_API_KEY`, `CADENCE_GROQ_MODEL`
//!
//! A provider section is created when one of its variables is set or the
//! provider is named as default or in the fallback chain.
//!
//! ## File Locations
//! `cadence.toml`, `cadence.json`, `config.toml` and `config.json` are probed
//! in the working directory, its parent and grandparent, then next to the
//! executable.

use std::path::{Path, PathBuf};

use cadence_domain::constants::{PROVIDER_CLAUDE, PROVIDER_GROQ, PROVIDER_OLLAMA, PROVIDER_OPENAI};
use cadence_domain::{AiConfig, CadenceError, FallbackConfig, OllamaConfig, ProviderConfig, Result};
use tracing::{debug, info};

pub const ENV_DEFAULT_PROVIDER: &str = "CADENCE_AI_DEFAULT_PROVIDER";
pub const ENV_FALLBACK: &str = "CADENCE_AI_FALLBACK";
pub const ENV_FALLBACK_ENABLED: &str = "CADENCE_AI_FALLBACK_ENABLED";
pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const ENV_OLLAMA_MODEL: &str = "CADENCE_OLLAMA_MODEL";
pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_CLAUDE_MODEL: &str = "CADENCE_CLAUDE_MODEL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "CADENCE_OPENAI_MODEL";
pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_GROQ_MODEL: &str = "CADENCE_GROQ_MODEL";

const CONFIG_FILE_NAMES: [&str; 4] = ["cadence.toml", "cadence.json", "config.toml", "config.json"];

/// Load configuration, environment first and file second.
///
/// # Errors
/// `CadenceError::Config` when neither source yields a valid configuration.
pub fn load() -> Result<AiConfig> {
    let mut config = match load_from_env() {
        Ok(config) => {
            info!("AI configuration loaded from environment variables");
            config
        }
        Err(err) => {
            debug!(error = %err, "environment configuration unavailable, trying file");
            load_from_file(None)?
        }
    };

    resolve_api_keys(&mut config);
    config.validate()?;
    Ok(config)
}

/// Configuration from environment variables alone.
///
/// # Errors
/// `CadenceError::Config` when `CADENCE_AI_DEFAULT_PROVIDER` is missing.
pub fn load_from_env() -> Result<AiConfig> {
    let default_provider = env_var(ENV_DEFAULT_PROVIDER)?.trim().to_string();

    let fallback = optional_env(ENV_FALLBACK).map(|list| FallbackConfig {
        enabled: env_bool(ENV_FALLBACK_ENABLED, true),
        providers: list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    });

    let named = |provider: &str| {
        default_provider == provider
            || fallback.as_ref().is_some_and(|f| f.providers.iter().any(|p| p == provider))
    };

    let ollama_host = optional_env(ENV_OLLAMA_HOST);
    let ollama_model = optional_env(ENV_OLLAMA_MODEL);
    let ollama = (ollama_host.is_some() || ollama_model.is_some() || named(PROVIDER_OLLAMA)).then(
        || {
            let defaults = OllamaConfig::default();
            OllamaConfig {
                host: ollama_host.unwrap_or(defaults.host),
                model: ollama_model.unwrap_or(defaults.model),
                timeout_secs: defaults.timeout_secs,
            }
        },
    );

    let hosted = |provider: &str, key_var: &str, model_var: &str| {
        let api_key = optional_env(key_var);
        let model = optional_env(model_var);
        (api_key.is_some() || model.is_some() || named(provider)).then(|| {
            ProviderConfig::new(api_key.unwrap_or_default(), model.unwrap_or_default())
        })
    };

    Ok(AiConfig {
        claude: hosted(PROVIDER_CLAUDE, ENV_ANTHROPIC_API_KEY, ENV_CLAUDE_MODEL),
        openai: hosted(PROVIDER_OPENAI, ENV_OPENAI_API_KEY, ENV_OPENAI_MODEL),
        groq: hosted(PROVIDER_GROQ, ENV_GROQ_API_KEY, ENV_GROQ_MODEL),
        default_provider,
        fallback,
        ollama,
    })
}

/// Configuration from a file; `None` probes the standard locations.
///
/// # Errors
/// `CadenceError::Config` when the file is missing, unreadable or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AiConfig> {
    let config_path = match path {
        Some(p) if !p.exists() => {
            return Err(CadenceError::Config(format!("config file not found: {}", p.display())));
        }
        Some(p) => p,
        None => probe_config_paths().ok_or_else(|| {
            CadenceError::Config("no config file found in any of the standard locations".into())
        })?,
    };

    info!(path = %config_path.display(), "loading AI configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CadenceError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Format is chosen by extension; anything but `.toml` is read as JSON.
fn parse_config(contents: &str, path: &Path) -> Result<AiConfig> {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("json") {
        "toml" => toml::from_str(contents)
            .map_err(|e| CadenceError::Config(format!("invalid TOML config: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CadenceError::Config(format!("invalid JSON config: {e}"))),
        other => Err(CadenceError::Config(format!("unsupported config format: {other}"))),
    }
}

/// First existing config file in the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Expand `${VAR}` references in API keys, then fill empty keys from the
/// provider's conventional variable.
pub fn resolve_api_keys(config: &mut AiConfig) {
    let sections = [
        (config.claude.as_mut(), ENV_ANTHROPIC_API_KEY),
        (config.openai.as_mut(), ENV_OPENAI_API_KEY),
        (config.groq.as_mut(), ENV_GROQ_API_KEY),
    ];

    for (section, fallback_var) in sections {
        let Some(section) = section else { continue };
        section.api_key = expand_env_refs(&section.api_key);
        if section.api_key.trim().is_empty() {
            section.api_key = optional_env(fallback_var).unwrap_or_default();
        }
    }
}

/// Replace every `${VAR}` in `value` with the variable's value. Unset
/// variables expand to nothing; an unterminated reference is kept as is.
pub fn expand_env_refs(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        out.push_str(&std::env::var(&after[..end]).unwrap_or_default());
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn env_var(key: &str) -> Result<String> {
    optional_env(key)
        .ok_or_else(|| CadenceError::Config(format!("missing required environment variable: {key}")))
}

/// Set and non-blank
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`, case-insensitively.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
