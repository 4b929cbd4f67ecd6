//! Parser and writer for `netmap/config.netmap`.
//!
//! The format is one `key: value` pair per line; blank lines and `#` comments
//! are ignored. Missing keys fall back to their defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::graph::model::{Layout, ProfileConfig, Theme};

pub const DEFAULT_ZOOM_STEP: f64 = 1.2;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Applied to profiles created from the CLI.
    pub profile_defaults: ProfileConfig,
    /// Multiplicative factor for one zoom step.
    pub zoom_step: f64,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profile_defaults: ProfileConfig::default(),
            zoom_step: DEFAULT_ZOOM_STEP,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

pub fn parse(input: &str) -> Result<Config> {
    let mut config = Config::default();
    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            bail!("line {}: expected `key: value`, found `{}`", idx + 1, line);
        };
        apply(&mut config, key.trim(), value.trim())
            .with_context(|| format!("line {}: invalid `{}`", idx + 1, key.trim()))?;
    }
    Ok(config)
}

/// Read the config at `path`, or the defaults when the file does not exist.
pub fn load(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("invalid config {}", path.display()))
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let defaults = &mut config.profile_defaults;
    match key {
        "layout" => {
            defaults.layout = match value {
                "hierarchical" => Layout::Hierarchical,
                "circular" => Layout::Circular,
                "grid" => Layout::Grid,
                other => bail!("unknown layout `{other}`"),
            }
        }
        "auto_arrange" => defaults.auto_arrange = parse_bool(value)?,
        "show_labels" => defaults.show_labels = parse_bool(value)?,
        "theme" => {
            defaults.theme = match value {
                "system" => Theme::System,
                "light" => Theme::Light,
                "dark" => Theme::Dark,
                other => bail!("unknown theme `{other}`"),
            }
        }
        "zoom_step" => {
            let step: f64 = value.parse().context("expected a number")?;
            if !(step.is_finite() && step > 1.0) {
                bail!("zoom_step must be greater than 1, got {step}");
            }
            config.zoom_step = step;
        }
        "log_filter" => {
            if !value.is_empty() {
                config.log_filter = value.to_string();
            }
        }
        other => bail!("unknown key `{other}`"),
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        other => bail!("expected true or false, found `{other}`"),
    }
}

pub fn serialize(config: &Config) -> String {
    let defaults = &config.profile_defaults;
    format!(
        "\
# netmap configuration
# Edit manually; profile settings can also be changed from `netmap view`.

# Defaults for newly created profiles
# layout: hierarchical | circular | grid
layout: {}
auto_arrange: {}
show_labels: {}
# theme: system | light | dark
theme: {}

# Factor applied per zoom step (must be greater than 1)
zoom_step: {}

# Log filter written to netmap/netmap.log (RUST_LOG overrides)
log_filter: {}
",
        defaults.layout.label(),
        defaults.auto_arrange,
        defaults.show_labels,
        defaults.theme.label(),
        config.zoom_step,
        config.log_filter
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_CONTENTS: &str = "\
# netmap configuration
# Edit manually; profile settings can also be changed from `netmap view`.

# Defaults for newly created profiles
# layout: hierarchical | circular | grid
layout: hierarchical
auto_arrange: true
show_labels: true
# theme: system | light | dark
theme: system

# Factor applied per zoom step (must be greater than 1)
zoom_step: 1.2

# Log filter written to netmap/netmap.log (RUST_LOG overrides)
log_filter: info
";

    #[test]
    fn default_contents_parse_to_default_config() {
        assert_eq!(parse(DEFAULT_CONTENTS).unwrap(), Config::default());
    }

    #[test]
    fn serialize_matches_default_contents() {
        assert_eq!(serialize(&Config::default()), DEFAULT_CONTENTS);
    }

    #[test]
    fn parse_reads_overrides_and_keeps_missing_defaults() {
        let config = parse("layout: grid\nshow_labels: off\nzoom_step: 1.5\n").unwrap();
        assert_eq!(config.profile_defaults.layout, Layout::Grid);
        assert!(!config.profile_defaults.show_labels);
        assert!(config.profile_defaults.auto_arrange);
        assert_eq!(config.zoom_step, 1.5);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn parse_reports_line_of_bad_entry() {
        let err = parse("# header\nlayout: spiral\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"), "got: {err:#}");

        let err = parse("colour: red\n").unwrap_err();
        assert!(format!("{err:#}").contains("unknown key"), "got: {err:#}");
    }

    #[test]
    fn load_falls_back_to_defaults_when_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.netmap");
        assert_eq!(load(&path).unwrap(), Config::default());

        fs::write(&path, "show_labels: false\n").unwrap();
        assert!(!load(&path).unwrap().profile_defaults.show_labels);
    }

    #[test]
    fn zoom_step_must_grow() {
        assert!(parse("zoom_step: 0.9\n").is_err());
        assert!(parse("zoom_step: fast\n").is_err());
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = Config::default();
        config.profile_defaults.theme = Theme::Dark;
        config.zoom_step = 1.25;
        config.log_filter = "netmap=debug".to_string();
        assert_eq!(parse(&serialize(&config)).unwrap(), config);
    }
}
