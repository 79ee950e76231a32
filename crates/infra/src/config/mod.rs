//! AI configuration loading
//!
//! Builds an [`AiConfig`](cadence_domain::AiConfig) snapshot from environment
//! variables or a TOML/JSON file.

pub mod loader;

pub use loader::{
    expand_env_refs, load, load_from_env, load_from_file, probe_config_paths, resolve_api_keys,
};
