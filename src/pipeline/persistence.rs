// Finds and reads the config file at startup. Nothing is ever written back:
// the composition starts fresh on every run.
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::pipeline::config::Config;

pub const CONFIG_FILE: &str = "pentadrift.json";

// <dir>/pentadrift.json
pub fn default_config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: Config = serde_json::from_str(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate().with_context(|| format!("invalid config {}", path.display()))?;
    info!(path = %path.display(), parts = config.parts.len(), "loaded config");
    Ok(config)
}

/// An explicit path must load; otherwise `pentadrift.json` in `dir` is used
/// when present, and the built-in defaults when not.
pub fn resolve_config(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let path = default_config_path(dir);
    if path.exists() {
        load_config(&path)
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pentadrift-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_default_file_gives_defaults() {
        let dir = scratch_dir("missing");
        let cfg = resolve_config(None, &dir).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = scratch_dir("explicit");
        let err = resolve_config(Some(&dir.join("nope.json")), &dir).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }

    #[test]
    fn reads_file_from_directory() {
        let dir = scratch_dir("reads");
        std::fs::write(default_config_path(&dir), r#"{ "bpm": 140, "initialKey": 3 }"#).unwrap();
        let cfg = resolve_config(None, &dir).unwrap();
        assert_eq!(cfg.bpm, 140.0);
        assert_eq!(cfg.initial_key, Some(3));
        std::fs::remove_file(default_config_path(&dir)).unwrap();
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        let dir = scratch_dir("invalid");
        let path = dir.join("bad.json");
        std::fs::write(&path, r#"{ "parts": [] }"#).unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn part_errors_surface_at_load_with_the_path() {
        let dir = scratch_dir("part-errors");
        let path = dir.join("decay.json");
        std::fs::write(&path, r#"{ "parts": [ { "name": "lead", "decay": -1 } ] }"#).unwrap();
        let err = load_config(&path).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("invalid config") && msg.contains("decay.json"), "{msg}");
        assert!(msg.contains("decay must be finite"), "{msg}");

        std::fs::write(&path, r#"{ "parts": [ { "patternLengths": [] } ] }"#).unwrap();
        let msg = format!("{:#}", load_config(&path).unwrap_err());
        assert!(msg.contains("invalid config"), "{msg}");
        std::fs::remove_file(&path).unwrap();
    }
}
